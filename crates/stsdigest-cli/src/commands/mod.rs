pub mod compile;
pub mod inspect;
pub mod scrape;
pub mod show;

use stsdigest_core::{Summary, TestTally};

/// Split a comma-separated category list, dropping empty entries.
pub fn parse_categories(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// `0.9231` style rate, or `n/a`.
pub fn fmt_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{r:.4}"),
        None => "n/a".to_string(),
    }
}

/// One-line summary: `passed/with_data rows passed (pass_rate=…)`.
pub fn summary_line(s: &Summary) -> String {
    format!(
        "{}/{} rows passed (pass_rate={}, no_data={})",
        s.rows_passed_all_criteria,
        s.rows_with_data,
        fmt_rate(s.pass_rate),
        s.rows_no_data
    )
}

/// Per-test breakdown table.
pub fn print_per_test(s: &Summary) {
    println!(
        "  {:<25} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>9} {:>9}",
        "Test", "Rows", "Data", "Pass", "F-Uni", "F-KS", "F-Prop", "AvgProp", "AvgKS"
    );
    println!("  {}", "-".repeat(87));
    for (test, tally) in &s.per_test_summary {
        println!("  {:<25} {}", test.as_str(), tally_columns(tally));
    }
}

fn tally_columns(t: &TestTally) -> String {
    format!(
        "{:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>9} {:>9}",
        t.count,
        t.with_data,
        t.passed_all_criteria,
        t.failed_uniformity,
        t.failed_ks,
        t.failed_proportion,
        fmt_rate(t.mean_proportion()),
        fmt_rate(t.mean_p_value_ks()),
    )
}
