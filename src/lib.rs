//! Storefront Images - fetch a marketplace storefront and save its product photos
//!
//! This library provides:
//! - Static and headless-browser page fetching
//! - Selector and keyword based product image extraction
//! - Sequential image downloading
//! - A JSON manifest of the saved images

pub mod core;
pub mod config;
pub mod scraper;
pub mod download;
pub mod export;
pub mod utils;
pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use crate::core::{Orchestrator, RunSummary};
pub use crate::config::AppConfig;
pub use crate::error::ExtractorError;
pub use crate::scraper::BrowserCapability;
