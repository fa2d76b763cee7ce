//! `stsdigest compile`: walk a results root and write the compiled document.

use std::path::Path;

use anyhow::{Context, Result, bail};
use stsdigest_core::{DEFAULT_OUTPUT_FILE, ReportLayout, compile};

pub struct CompileCommandConfig<'a> {
    pub root: &'a Path,
    pub categories: &'a str,
    pub report_file: String,
    pub freq_file: String,
    pub output_path: Option<&'a Path>,
}

/// Run the compile command.
pub fn run(cfg: CompileCommandConfig<'_>) -> Result<()> {
    let categories = super::parse_categories(cfg.categories);
    if categories.is_empty() {
        bail!("--categories must name at least one category");
    }
    let layout = ReportLayout {
        report_file: cfg.report_file,
        frequency_file: cfg.freq_file,
        ..ReportLayout::with_categories(categories)
    };

    let doc = compile(cfg.root, &layout);

    let output = cfg
        .output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.root.join(DEFAULT_OUTPUT_FILE));
    doc.write_to(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Compiled {} run(s) from {}", doc.metadata.total_runs, cfg.root.display());
    for (category, count) in &doc.metadata.runs_per_category {
        println!("  {category:<12} {count:>5} run(s)");
    }

    if doc.global_summary.is_empty() {
        println!("\nNo runs with a recognized name; no corpus summaries.");
    } else {
        println!("\n{:<25} {:>5}  Summary", "Corpus", "Runs");
        println!("{}", "-".repeat(80));
        for (key, corpus) in &doc.global_summary {
            println!(
                "{key:<25} {:>5}  {}",
                corpus.num_runs,
                super::summary_line(&corpus.summary)
            );
        }
    }

    println!("\nWrote {}", output.display());
    Ok(())
}
