use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

pub mod browser;
pub mod extract;
pub mod http_client;

use crate::config::AppConfig;
use browser::BrowserClient;
use extract::ImageExtractor;
use http_client::HttpClient;

/// Whether the headless-browser strategy can be used in this run.
///
/// Resolved once at startup and handed to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserCapability {
    Available,
    Unavailable,
}

impl BrowserCapability {
    /// Available only when compiled with the `browser` feature and enabled in config
    pub fn detect(config: &AppConfig) -> Self {
        if cfg!(feature = "browser") && config.fetch.browser_enabled {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// One way of turning a storefront URL into candidate image URLs
#[async_trait(?Send)]
pub trait ImageSource {
    /// Short name used in logs and the run summary
    fn name(&self) -> &'static str;

    /// Fetch the page and extract candidates; an empty list is not an error
    async fn discover(&self, target: &Url) -> Result<Vec<String>>;
}

/// Plain GET of the page, no script execution
pub struct StaticSource {
    http_client: Arc<HttpClient>,
    extractor: Arc<ImageExtractor>,
}

impl StaticSource {
    pub fn new(http_client: Arc<HttpClient>, extractor: Arc<ImageExtractor>) -> Self {
        Self { http_client, extractor }
    }
}

#[async_trait(?Send)]
impl ImageSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn discover(&self, target: &Url) -> Result<Vec<String>> {
        let html = self.http_client.fetch_page(target).await?;
        Ok(self.extractor.extract_static(&html, target))
    }
}

/// Page rendered in a headless browser before extraction
pub struct RenderedSource {
    browser: BrowserClient,
    extractor: Arc<ImageExtractor>,
}

impl RenderedSource {
    pub fn new(browser: BrowserClient, extractor: Arc<ImageExtractor>) -> Self {
        Self { browser, extractor }
    }
}

#[async_trait(?Send)]
impl ImageSource for RenderedSource {
    fn name(&self) -> &'static str {
        "rendered"
    }

    async fn discover(&self, target: &Url) -> Result<Vec<String>> {
        let markup = self.browser.render(target).await?;
        Ok(self.extractor.extract_rendered(&markup, target))
    }
}

/// Build the ordered source list: rendered first when available, static always last
pub fn default_sources(
    config: &AppConfig,
    capability: BrowserCapability,
    http_client: Arc<HttpClient>,
) -> Result<Vec<Box<dyn ImageSource>>> {
    let extractor = Arc::new(ImageExtractor::new(&config.target.domain_hint)?);
    let mut sources: Vec<Box<dyn ImageSource>> = Vec::new();

    if capability.is_available() {
        sources.push(Box::new(RenderedSource::new(
            BrowserClient::new(&config.fetch),
            extractor.clone(),
        )));
    }
    sources.push(Box::new(StaticSource::new(http_client, extractor)));

    Ok(sources)
}

/// Candidates from the first source that produced any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub source: Option<&'static str>,
    pub urls: Vec<String>,
}

/// Try each source in order until one yields a non-empty list.
///
/// Source failures are logged and treated as an empty result.
pub async fn discover_images(sources: &[Box<dyn ImageSource>], target: &Url) -> Discovery {
    for source in sources {
        info!("Trying {} extraction for {}", source.name(), target);

        match source.discover(target).await {
            Ok(urls) if !urls.is_empty() => {
                info!("{} extraction found {} images", source.name(), urls.len());
                return Discovery {
                    source: Some(source.name()),
                    urls,
                };
            }
            Ok(_) => {
                info!("{} extraction found no images", source.name());
            }
            Err(e) => {
                warn!("{} extraction failed for {}: {:#}", source.name(), target, e);
            }
        }
    }

    Discovery::default()
}
