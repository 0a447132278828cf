use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ExtractorError;
use crate::logging::LoggingConfig;

/// Storefront opened when the prompt is left blank
pub const DEFAULT_STORE_URL: &str = "https://www.mercari.com/mypage/listings/active/";

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target: TargetConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub default_url: String,
    /// Lowercase substring that marks marketplace-hosted image URLs
    pub domain_hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub page_timeout_seconds: u64,
    pub image_timeout_seconds: u64,
    pub browser_enabled: bool,
    pub browser_settle_ms: u64,
    pub browser_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root that manifest entries are relative to; the crate directory when unset
    pub project_root: Option<PathBuf>,
    /// Image directory, relative to the project root
    pub image_dir: PathBuf,
    pub manifest_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_STORE_URL.to_string(),
            domain_hint: "mercari".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_seconds: 15,
            image_timeout_seconds: 10,
            browser_enabled: true,
            browser_settle_ms: 5000,
            browser_timeout_seconds: 60,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            image_dir: PathBuf::from("img").join("products"),
            manifest_file: "images.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Config file to load: an explicit path, else the platform default when it exists
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => get_config_path().filter(|path| path.exists()),
        }
    }

    /// Load configuration from `path`, or defaults when there is no file
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: AppConfig = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.target.default_url.trim().is_empty() {
            return Err(ExtractorError::config("target.default_url must not be empty"));
        }

        if self.target.domain_hint.trim().is_empty() {
            return Err(ExtractorError::config("target.domain_hint must not be empty"));
        }

        if self.fetch.user_agent.trim().is_empty() {
            return Err(ExtractorError::config("fetch.user_agent must not be empty"));
        }

        if self.fetch.page_timeout_seconds == 0 || self.fetch.image_timeout_seconds == 0 {
            return Err(ExtractorError::config("fetch timeouts must be > 0"));
        }

        if self.fetch.browser_timeout_seconds == 0 {
            return Err(ExtractorError::config("fetch.browser_timeout_seconds must be > 0"));
        }

        if self.output.manifest_file.trim().is_empty() {
            return Err(ExtractorError::config("output.manifest_file must not be empty"));
        }

        if self.output.image_dir.is_absolute() {
            return Err(ExtractorError::config("output.image_dir must be relative to the project root"));
        }

        Ok(())
    }

    /// Resolve the project root that output paths hang off.
    ///
    /// Without an explicit root this is the crate directory the binary was
    /// built from, so every run writes to the same place regardless of the
    /// working directory.
    pub fn project_root(&self) -> PathBuf {
        match &self.output.project_root {
            Some(root) => root.clone(),
            None => default_project_root(),
        }
    }

    /// Directory that downloaded images and the manifest land in
    pub fn output_dir(&self) -> PathBuf {
        self.project_root().join(&self.output.image_dir)
    }
}

/// Fixed project root used when none is configured
pub fn default_project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Get the configuration file path
fn get_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "storefront", "storefront-images")
        .map(|dirs| dirs.config_dir().join("storefront-images.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        if let Ok(log_level) = std::env::var("STOREFRONT_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Ok(browser) = std::env::var("STOREFRONT_BROWSER") {
            config.fetch.browser_enabled = parse_flag(&browser);
        }

        if let Ok(root) = std::env::var("STOREFRONT_PROJECT_ROOT") {
            if !root.trim().is_empty() {
                config.output.project_root = Some(PathBuf::from(root));
            }
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
