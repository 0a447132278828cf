use anyhow::Result;
use reqwest::{header::{HeaderMap, HeaderValue}, Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{ExtractorError, ExtractorResult};

/// HTTP client wrapper for the storefront page and its images.
///
/// Every call is a single attempt with its own timeout; nothing is retried.
pub struct HttpClient {
    client: Client,
    user_agent: String,
    page_timeout: Duration,
    image_timeout: Duration,
}

impl HttpClient {
    /// Create new HTTP client
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"));
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        info!("HTTP client initialized");

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_seconds),
            image_timeout: Duration::from_secs(config.image_timeout_seconds),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetch the raw HTML of a page
    pub async fn fetch_page(&self, url: &Url) -> ExtractorResult<String> {
        let start_time = Instant::now();
        let response = self.get(url.as_str(), self.page_timeout).await?;

        let html = response
            .text()
            .await
            .map_err(|e| ExtractorError::from_reqwest(url.as_str(), e))?;

        debug!("Fetched {} bytes from {} in {}ms", html.len(), url, start_time.elapsed().as_millis());
        Ok(html)
    }

    /// Fetch the full body of an image
    pub async fn fetch_bytes(&self, url: &str) -> ExtractorResult<Vec<u8>> {
        let response = self.get(url, self.image_timeout).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ExtractorError::from_reqwest(url, e))?;

        Ok(body.to_vec())
    }

    /// Make a single GET; non-success statuses are errors
    async fn get(&self, url: &str, timeout: Duration) -> ExtractorResult<Response> {
        debug!("HTTP GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ExtractorError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
