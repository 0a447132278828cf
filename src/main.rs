use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use storefront_images::config::{AppConfig, ConfigOverrides};
use storefront_images::core::{prompt_for_url, resolve_target_url};
use storefront_images::logging::init_logging;
use storefront_images::{BrowserCapability, ExtractorError, Orchestrator};

#[derive(Parser)]
#[command(name = "storefront-images")]
#[command(about = "Download the product images from your own storefront page")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[arg(short, long, help = "Storefront URL (prompted for when omitted)")]
    url: Option<String>,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, help = "Configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Skip the headless browser and fetch the page directly")]
    no_browser: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        error!("Run failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        eprintln!("{}", remediation(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = AppConfig::locate(cli.config.as_deref());
    let mut config = AppConfig::load(config_path.as_deref()).await?;
    ConfigOverrides::apply(&mut config);
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.no_browser {
        config.fetch.browser_enabled = false;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    info!("Storefront Images v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let capability = BrowserCapability::detect(&config);
    if !capability.is_available() {
        println!("Note: headless browser not available. Will fetch the page directly.");
    }

    let answer = match cli.url {
        Some(url) => url,
        None => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            prompt_for_url(&mut input, &mut output, &config.target.default_url)?
        }
    };

    let (target, defaulted) = resolve_target_url(&answer, &config.target.default_url);
    if defaulted {
        println!("Using default URL: {}", target);
    }

    let orchestrator = Orchestrator::from_config(&config, capability)?;
    let summary = orchestrator.run(&target).await?;

    info!(
        "Run finished: source={:?} discovered={} downloaded={} failed={}",
        summary.source,
        summary.discovered,
        summary.downloaded.len(),
        summary.failed
    );

    Ok(())
}

/// Human-readable next step for a fatal error
fn remediation(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ExtractorError>() {
        Some(ExtractorError::Configuration { .. }) => {
            "Fix the configuration file, or remove it to fall back to the defaults."
        }
        Some(ExtractorError::Manifest { .. }) | Some(ExtractorError::FileSystem { .. }) => {
            "Check that the output directory exists and is writable."
        }
        _ => "Re-run with --verbose for more detail.",
    }
}
