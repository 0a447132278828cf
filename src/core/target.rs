use anyhow::Result;
use std::io::{BufRead, Write};
use url::Url;

use crate::error::{ExtractorError, ExtractorResult};

/// Ask for the storefront URL on `output` and read one line from `input`.
///
/// Returns the trimmed line; an empty string means "use the default".
pub fn prompt_for_url<R: BufRead, W: Write>(input: &mut R, output: &mut W, example: &str) -> Result<String> {
    write!(output, "Enter your Mercari store URL (e.g., {}): ", example)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Resolve the run's target URL; blank input falls back to `default_url`.
///
/// Only emptiness is checked here. Input without a scheme gets `https://`
/// prefixed. Returns the URL string and whether the default was used.
pub fn resolve_target_url(input: &str, default_url: &str) -> (String, bool) {
    let input = input.trim();
    let (raw, defaulted) = if input.is_empty() {
        (default_url.trim(), true)
    } else {
        (input, false)
    };

    if raw.contains("://") {
        (raw.to_string(), defaulted)
    } else {
        (format!("https://{}", raw), defaulted)
    }
}

/// Parse a resolved target; failure only means there is nothing to fetch
pub fn parse_target(raw: &str) -> ExtractorResult<Url> {
    Url::parse(raw).map_err(|_| ExtractorError::InvalidUrl { url: raw.to_string() })
}
