//! `stsdigest show`: print summaries from a compiled document.

use std::path::Path;

use anyhow::{Context, Result, bail};
use stsdigest_core::CompiledDocument;

/// Run the show command.
pub fn run(path: &Path, corpus: Option<&str>, all: bool) -> Result<()> {
    let doc = CompiledDocument::read_from(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    println!("{}", doc.description);
    println!("Source:     {}", doc.metadata.source_directory.display());
    println!("Runs:       {}", doc.metadata.total_runs);
    println!("Categories: {}", doc.categories.join(", "));
    println!();

    if let Some(key) = corpus {
        let Some(c) = doc.global_summary.get(key) else {
            let known: Vec<&str> = doc.global_summary.keys().map(String::as_str).collect();
            bail!("no corpus '{key}' (known: {})", known.join(", "));
        };
        println!("{key}: {} run(s)", c.num_runs);
        println!("  {}", super::summary_line(&c.summary));
        super::print_per_test(&c.summary);
        return Ok(());
    }

    if doc.global_summary.is_empty() {
        println!("No corpus summaries in this document.");
        return Ok(());
    }

    for (key, c) in &doc.global_summary {
        println!("{key}: {} run(s)", c.num_runs);
        println!("  {}", super::summary_line(&c.summary));
        if all {
            super::print_per_test(&c.summary);
            println!();
        }
    }
    Ok(())
}
