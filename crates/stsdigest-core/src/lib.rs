//! # stsdigest-core
//!
//! **One JSON document for a whole tree of NIST STS runs.**
//!
//! The NIST Statistical Test Suite leaves a `finalAnalysisReport.txt` (and a
//! `freq.txt` bit-count file) in every run directory. `stsdigest-core` walks
//! a results tree laid out as `<root>/<category>/<run>/`, decodes every
//! report into typed rows, and aggregates them per run and per
//! category/origin corpus.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use stsdigest_core::{ReportLayout, compile};
//!
//! let layout = ReportLayout::default();
//! let doc = compile(Path::new("results"), &layout);
//!
//! for (key, corpus) in &doc.global_summary {
//!     println!("{key}: {} runs, pass rate {:?}", corpus.num_runs, corpus.summary.pass_rate);
//! }
//! doc.write_to(Path::new("results/nist_results_compressed.json")).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Locate runs → parse header + rows + freq → run record → corpus summaries
//!
//! Parsing never fails. Missing reports skip the run, rows that cannot be
//! decoded are dropped, unmatched header clauses stay absent. Only writing
//! or reading the compiled document returns errors.
//!
//! Run compilation is independent per run: [`compile_run`] can be called
//! from several threads, and [`CompiledDocument::assemble`] aggregates the
//! finished records.

pub mod compiler;
pub mod console;
pub mod error;
pub mod frequency;
pub mod header;
pub mod layout;
pub mod locator;
pub mod rows;
pub mod summary;

pub use compiler::{
    CompiledDocument, CorpusSummary, DEFAULT_OUTPUT_FILE, DOCUMENT_DESCRIPTION, DocumentMetadata,
    ParsedReport, RunRecord, compile, compile_run, corpus_key, parse_report, read_report,
};
pub use console::{ConsoleCapture, scrape_console_output};
pub use error::{DigestError, Result};
pub use frequency::{
    FrequencyFile, FrequencySample, FrequencySummary, parse_frequency, read_frequency_file,
};
pub use header::{ReportHeader, extract_header};
pub use layout::{
    DEFAULT_CATEGORIES, DEFAULT_FREQUENCY_FILE, DEFAULT_REPORT_FILE, ReportLayout, TestName,
    UnknownTestName,
};
pub use locator::{CategoryRuns, OriginKind, RunCandidate, RunIdentity, RunName, locate_runs};
pub use rows::{
    Criteria, Criterion, LineKind, OutcomeRow, RowError, RowScan, classify_line, match_test_name,
    parse_row, scan_rows,
};
pub use summary::{Summary, SummaryAccumulator, TestTally};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
