//! `stsdigest scrape`: key/value scraping of captured console output.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use stsdigest_core::scrape_console_output;

/// Run the scrape command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let text = match path {
        Some(p) => {
            let bytes =
                std::fs::read(p).with_context(|| format!("failed to read {}", p.display()))?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };

    let capture = scrape_console_output(&text);
    log::info!(
        "scraped {} line(s), {} key/value pair(s)",
        capture.lines.len(),
        capture.kv.len()
    );
    println!("{}", serde_json::to_string_pretty(&capture)?);
    Ok(())
}
