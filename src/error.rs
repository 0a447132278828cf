use thiserror::Error;

/// Error types for the storefront image pipeline
#[derive(Error, Debug)]
pub enum ExtractorError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    // Network errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    // Browser errors
    #[error("Browser error: {message}")]
    Browser { message: String },

    #[error("Headless browser support is not available")]
    BrowserUnavailable,

    // Output errors
    #[error("File system error: {path}: {message}")]
    FileSystem { path: String, message: String },

    #[error("Manifest write failed: {path}: {message}")]
    Manifest { path: String, message: String },
}

impl ExtractorError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a browser error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser { message: message.into() }
    }

    /// Classify a reqwest failure for `url`
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else if let Some(status) = err.status() {
            Self::HttpStatus { url: url.to_string(), status: status.as_u16() }
        } else {
            Self::Network { message: format!("{}: {}", url, err) }
        }
    }

    /// Whether the run can continue past this error.
    ///
    /// Fetch, target and download failures only skip one strategy, the
    /// fetch step or one image; configuration and output failures end the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. }
            | Self::HttpStatus { .. }
            | Self::Timeout { .. }
            | Self::Browser { .. }
            | Self::BrowserUnavailable
            | Self::InvalidUrl { .. } => true,

            Self::Configuration { .. }
            | Self::FileSystem { .. }
            | Self::Manifest { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::InvalidUrl { .. }
            | Self::Network { .. }
            | Self::HttpStatus { .. }
            | Self::Timeout { .. } => "network",
            Self::Browser { .. } | Self::BrowserUnavailable => "browser",
            Self::FileSystem { .. } | Self::Manifest { .. } => "output",
        }
    }
}

/// Result type alias for the pipeline
pub type ExtractorResult<T> = std::result::Result<T, ExtractorError>;
