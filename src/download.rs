use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::error::ExtractorError;
use crate::logging::LogContext;
use crate::scraper::http_client::HttpClient;
use crate::utils::format_file_size;
use crate::{log_info, log_warn};

/// A candidate URL that made it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    pub source_url: String,
    pub path: PathBuf,
}

/// Local filename for the `index`-th (1-based) candidate.
///
/// Uses the last path segment of the URL when it has an extension, otherwise
/// `product_<index>.jpg`. Collisions are not checked.
pub fn derive_filename(url: &str, index: usize) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    if segment.is_empty() || !segment.contains('.') {
        format!("product_{}.jpg", index)
    } else {
        segment
    }
}

/// Sequential single-attempt image downloader
pub struct Downloader {
    http_client: Arc<HttpClient>,
}

impl Downloader {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    /// Fetch `url` and write the body to `dest`, replacing any existing file.
    ///
    /// Never fails past this boundary: every error is logged and reported as `false`.
    pub async fn download_image(&self, url: &str, dest: &Path) -> bool {
        let context = LogContext::new("downloader", "download_image").with_url(url);

        match self.try_download(url, dest).await {
            Ok(bytes) => {
                debug!("Saved {} to {}", format_file_size(bytes), dest.display());
                let context = context.with_status("saved");
                log_info!(context, "Image downloaded");
                true
            }
            Err(e) => {
                println!("  Failed to download {}: {}", url, e);
                let context = context
                    .with_status("failed")
                    .with_error_category(e.category());
                log_warn!(context, e, "Image download failed");
                false
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path) -> Result<u64, ExtractorError> {
        let body = self.http_client.fetch_bytes(url).await?;

        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| ExtractorError::FileSystem {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(body.len() as u64)
    }
}
