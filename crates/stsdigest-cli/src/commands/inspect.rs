//! `stsdigest inspect`: decode one report without a results tree.

use std::path::Path;

use anyhow::{Context, Result};
use stsdigest_core::{
    DEFAULT_FREQUENCY_FILE, FrequencyFile, RunRecord, TestName, read_frequency_file, read_report,
};

/// Run the inspect command.
pub fn run(report_path: &Path, freq_path: Option<&Path>, json: bool) -> Result<()> {
    let report = read_report(report_path, &TestName::ALL)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    let dropped = report.dropped_rows;

    let run_dir = report_path.parent();
    let freq = match freq_path {
        Some(p) => read_frequency_file(p),
        None => run_dir
            .map(|dir| read_frequency_file(&dir.join(DEFAULT_FREQUENCY_FILE)))
            .unwrap_or_default(),
    };
    let run_name = run_dir
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let record = RunRecord::new(run_name, report, &freq);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record, &freq, dropped);
    Ok(())
}

fn print_record(record: &RunRecord, freq: &FrequencyFile, dropped: usize) {
    let h = &record.header;
    println!("Run:        {}", record.run_name);
    if let (Some(cat), Some(origin), Some(seed)) = (
        &record.identity.category,
        record.identity.origin,
        record.identity.seed,
    ) {
        println!("Identity:   {cat} / {origin} / seed {seed}");
    }
    println!("Generator:  {}", h.generator.as_deref().unwrap_or("n/a"));
    println!(
        "Threshold:  {} over {} sequences",
        super::fmt_rate(h.min_pass_rate),
        h.sample_size.map_or("n/a".to_string(), |n| n.to_string())
    );
    println!(
        "Excursion:  {} over {} sequences",
        super::fmt_rate(h.min_pass_rate_random_excursion),
        h.sample_size_random_excursion
            .map_or("n/a".to_string(), |n| n.to_string())
    );
    if let Some(bits) = &record.bit_statistics {
        println!(
            "Bits:       {} sequences x {} bits, zero ratio {} (alpha {})",
            bits.num_sequences,
            bits.bits_per_sequence,
            super::fmt_rate(bits.zero_ratio),
            super::fmt_rate(freq.alpha)
        );
    }

    println!();
    println!(
        "{:>40}  {:>9}   {:>9}   {:>9}    Test",
        "C1..C10", "P-VALUE", "KS", "PROP"
    );
    println!("{}", "-".repeat(96));
    for row in &record.tests {
        println!("{row}");
    }
    if dropped > 0 {
        println!("({dropped} undecodable row(s) dropped)");
    }

    println!();
    println!("{}", super::summary_line(&record.summary));
}
