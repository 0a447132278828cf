//! Run orchestration: target resolution, source fallback, downloads, manifest

pub mod orchestrator;
pub mod target;

pub use orchestrator::{Orchestrator, OutputLayout, RunSummary};
pub use target::{parse_target, prompt_for_url, resolve_target_url};
