#[cfg(feature = "browser")]
use anyhow::Result;
#[cfg(feature = "browser")]
use playwright::Playwright;
#[cfg(feature = "browser")]
use std::time::Duration;
#[cfg(feature = "browser")]
use tracing::{debug, warn};
#[cfg(feature = "browser")]
use url::Url;

#[cfg(feature = "browser")]
use crate::config::FetchConfig;
#[cfg(feature = "browser")]
use crate::error::ExtractorError;

/// Headless Chromium client that returns the rendered page markup
#[cfg(feature = "browser")]
pub struct BrowserClient {
    user_agent: String,
    settle: Duration,
    timeout_ms: u32,
}

#[cfg(feature = "browser")]
impl BrowserClient {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            settle: Duration::from_millis(config.browser_settle_ms),
            timeout_ms: config.browser_timeout_seconds.saturating_mul(1000).min(u32::MAX as u64) as u32,
        }
    }

    /// Navigate to `url`, let client-side rendering settle, capture the DOM.
    ///
    /// The browser is closed before returning, whether navigation and capture
    /// succeeded or not.
    pub async fn render(&self, url: &Url) -> Result<String> {
        debug!("Rendering {} in headless Chromium", url);

        let playwright = Playwright::initialize()
            .await
            .map_err(|e| ExtractorError::browser(format!("failed to start Playwright driver: {}", e)))?;
        let args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];

        let browser = playwright
            .chromium()
            .launcher()
            .headless(true)
            .chromium_sandbox(false)
            .args(&args)
            .launch()
            .await
            .map_err(|e| ExtractorError::browser(format!("failed to launch Chromium: {}", e)))?;

        let result = async {
            let context = browser
                .context_builder()
                .user_agent(&self.user_agent)
                .build()
                .await?;

            let page = context.new_page().await?;
            page.set_default_timeout(self.timeout_ms).await?;

            page.goto_builder(url.as_str()).goto().await?;

            // No DOM signal to wait on; give client-side rendering a fixed window.
            tokio::time::sleep(self.settle).await;

            let markup = page.content().await?;
            Ok::<String, anyhow::Error>(markup)
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }

        result.map_err(|e| ExtractorError::browser(format!("{:#}", e)).into())
    }
}

// Stub implementation when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserClient;

#[cfg(not(feature = "browser"))]
impl BrowserClient {
    pub fn new(_config: &crate::config::FetchConfig) -> Self {
        Self
    }

    pub async fn render(&self, _url: &url::Url) -> anyhow::Result<String> {
        Err(crate::error::ExtractorError::BrowserUnavailable.into())
    }
}
