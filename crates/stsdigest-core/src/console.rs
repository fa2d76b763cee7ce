//! Best-effort scraping of captured harness console output.
//!
//! The battery's interactive driver prints progress and settings as loosely
//! formatted `key: value` or `key = value` lines. Nothing here feeds the
//! report compiler; it exists for quick inspection of a captured log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lines and key/value pairs recovered from console text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleCapture {
    /// Every non-empty line, trimmed, in order.
    pub lines: Vec<String>,
    /// Later keys overwrite earlier ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kv: BTreeMap<String, String>,
}

/// Scrape console text.
///
/// A line is split at its first `:` when the part before it is non-empty,
/// otherwise at its first `=`. Keys must be non-empty after trimming; values
/// may be empty.
pub fn scrape_console_output(text: &str) -> ConsoleCapture {
    let mut capture = ConsoleCapture::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        capture.lines.push(line.to_string());

        if let Some((key, value)) = split_pair(line) {
            capture.kv.insert(key.to_string(), value.to_string());
        }
    }

    capture
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    [':', '='].into_iter().find_map(|sep| {
        let (key, value) = line.split_once(sep)?;
        let key = key.trim();
        (!key.is_empty()).then(|| (key, value.trim()))
    })
}
