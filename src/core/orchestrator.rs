use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::target::parse_target;
use crate::download::{derive_filename, DownloadedImage, Downloader};
use crate::error::ExtractorError;
use crate::export::write_manifest;
use crate::scraper::http_client::HttpClient;
use crate::scraper::{default_sources, discover_images, BrowserCapability, Discovery, ImageSource};
use crate::utils::FileUtils;

/// Where a run writes its files
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub project_root: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_file: String,
}

impl OutputLayout {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            project_root: config.project_root(),
            output_dir: config.output_dir(),
            manifest_file: config.output.manifest_file.clone(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_file)
    }

    /// Create the output directory; calling it again is a no-op
    pub async fn prepare(&self) -> Result<()> {
        FileUtils::ensure_dir(&self.output_dir).await.map_err(|e| {
            ExtractorError::FileSystem {
                path: self.output_dir.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub source: Option<&'static str>,
    pub discovered: usize,
    pub downloaded: Vec<DownloadedImage>,
    pub failed: usize,
    pub manifest_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn found_nothing(&self) -> bool {
        self.discovered == 0
    }
}

/// Drives fetch, extraction, download and manifest for one storefront
pub struct Orchestrator {
    sources: Vec<Box<dyn ImageSource>>,
    downloader: Downloader,
    layout: OutputLayout,
}

impl Orchestrator {
    pub fn new(sources: Vec<Box<dyn ImageSource>>, downloader: Downloader, layout: OutputLayout) -> Self {
        Self { sources, downloader, layout }
    }

    /// Wire up the default sources and downloader from configuration
    pub fn from_config(config: &AppConfig, capability: BrowserCapability) -> Result<Self> {
        let http_client = Arc::new(HttpClient::new(&config.fetch)?);
        let sources = default_sources(config, capability, http_client.clone())?;
        let layout = OutputLayout::from_config(config);

        info!(
            "Orchestrator ready with sources: {}",
            sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self::new(sources, Downloader::new(http_client), layout))
    }

    /// Run the pipeline against `target`.
    ///
    /// Finding nothing is a normal outcome and writes no manifest, and so is
    /// a target that does not parse. Only output-directory and manifest
    /// failures are returned as errors.
    pub async fn run(&self, target: &str) -> Result<RunSummary> {
        self.layout.prepare().await?;

        println!("\nExtracting images from: {}", target);
        println!("Output directory: {}\n", self.layout.output_dir.display());

        let discovery = match parse_target(target) {
            Ok(url) => discover_images(&self.sources, &url).await,
            Err(e) if e.is_recoverable() => {
                warn!("Skipping fetch ({}): {}", e.category(), e);
                Discovery::default()
            }
            Err(e) => return Err(e.into()),
        };
        let mut summary = RunSummary {
            source: discovery.source,
            discovered: discovery.urls.len(),
            ..RunSummary::default()
        };

        if summary.found_nothing() {
            print_no_images_help();
            return Ok(summary);
        }

        println!("\nFound {} unique image URLs", summary.discovered);
        println!("\nDownloading images...");

        let total = discovery.urls.len();
        for (i, url) in discovery.urls.into_iter().enumerate() {
            let index = i + 1;
            let filename = derive_filename(&url, index);
            let path = self.layout.output_dir.join(&filename);

            println!("[{}/{}] Downloading: {}", index, total, filename);
            if self.downloader.download_image(&url, &path).await {
                summary.downloaded.push(DownloadedImage { source_url: url, path });
            } else {
                summary.failed += 1;
            }
        }

        println!(
            "\nSuccessfully downloaded {} images to {}",
            summary.downloaded.len(),
            self.layout.output_dir.display()
        );

        let paths: Vec<PathBuf> = summary.downloaded.iter().map(|image| image.path.clone()).collect();
        let stats = write_manifest(&paths, &self.layout.project_root, &self.layout.manifest_path())?;
        println!("Image list saved to: {}", stats.path.display());
        summary.manifest_path = Some(stats.path);

        print_next_steps();
        Ok(summary)
    }
}

fn print_no_images_help() {
    println!("\nNo images found. Possible reasons:");
    println!("   1. The page requires authentication (login)");
    println!("   2. The page needs JavaScript rendering (build with --features browser)");
    println!("   3. The marketplace's HTML structure has changed");
}

fn print_next_steps() {
    println!("\nNext steps:");
    println!("1. Review the downloaded images");
    println!("2. Point your slideshow at the paths listed in the image list");
    println!("3. Test the slideshow locally");
}
