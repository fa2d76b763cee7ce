//! Report compiler: run directories in, one aggregated document out.
//!
//! ```text
//! locate_runs → compile_run (header + rows + freq → RunRecord) → assemble (corpus summaries)
//! ```
//!
//! [`compile_run`] only reads its own run directory and returns an owned
//! record, so callers may fan runs out across threads and hand the finished
//! records to [`CompiledDocument::assemble`]. Corpus summaries are computed
//! there, after every run is complete.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};
use crate::frequency::{FrequencyFile, FrequencySummary, read_frequency_file};
use crate::header::{ReportHeader, extract_header};
use crate::layout::{ReportLayout, TestName};
use crate::locator::{OriginKind, RunCandidate, RunIdentity, locate_runs};
use crate::rows::{OutcomeRow, scan_rows};
use crate::summary::Summary;

/// Description stored at the top of every compiled document.
pub const DOCUMENT_DESCRIPTION: &str = "Compressed NIST STS statistical test results";

/// Default output file name, written into the source root.
pub const DEFAULT_OUTPUT_FILE: &str = "nist_results_compressed.json";

// ---------------------------------------------------------------------------
// Single report
// ---------------------------------------------------------------------------

/// Header and rows of one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    pub header: ReportHeader,
    pub rows: Vec<OutcomeRow>,
    /// Row-shaped lines that could not be decoded.
    pub dropped_rows: usize,
}

/// Parse report text.
pub fn parse_report(content: &str, test_names: &[TestName]) -> ParsedReport {
    let scan = scan_rows(content, test_names);
    ParsedReport {
        header: extract_header(content),
        rows: scan.rows,
        dropped_rows: scan.dropped,
    }
}

/// Read and parse a report file. Invalid UTF-8 is replaced, not rejected.
pub fn read_report(path: &Path, test_names: &[TestName]) -> Result<ParsedReport> {
    let bytes = fs::read(path).map_err(|e| DigestError::io(path, e))?;
    Ok(parse_report(&String::from_utf8_lossy(&bytes), test_names))
}

// ---------------------------------------------------------------------------
// Run records
// ---------------------------------------------------------------------------

/// Everything recovered from one run directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_name: String,
    #[serde(flatten)]
    pub identity: RunIdentity,
    #[serde(flatten)]
    pub header: ReportHeader,
    pub bit_statistics: Option<FrequencySummary>,
    pub summary: Summary,
    pub tests: Vec<OutcomeRow>,
}

impl RunRecord {
    /// Build a record; identity comes from `run_name`.
    pub fn new(run_name: impl Into<String>, report: ParsedReport, freq: &FrequencyFile) -> Self {
        let run_name = run_name.into();
        let summary = Summary::from_rows(&report.rows);
        Self {
            identity: RunIdentity::from_dir_name(&run_name),
            run_name,
            header: report.header,
            bit_statistics: freq.summary(),
            summary,
            tests: report.rows,
        }
    }
}

/// Compile one run directory.
///
/// Returns `None` (after logging a warning) when the report file is missing
/// or unreadable. A missing frequency file only leaves `bit_statistics` unset.
pub fn compile_run(candidate: &RunCandidate, layout: &ReportLayout) -> Option<RunRecord> {
    let report_path = candidate.path.join(&layout.report_file);
    if !report_path.is_file() {
        log::warn!(
            "{}/{}: no {}, skipping run",
            candidate.category,
            candidate.name,
            layout.report_file
        );
        return None;
    }

    let report = match read_report(&report_path, &layout.test_names) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("{}/{}: {e}, skipping run", candidate.category, candidate.name);
            return None;
        }
    };
    if report.dropped_rows > 0 {
        log::warn!(
            "{}/{}: dropped {} undecodable result row(s)",
            candidate.category,
            candidate.name,
            report.dropped_rows
        );
    }

    let freq = read_frequency_file(&candidate.path.join(&layout.frequency_file));
    Some(RunRecord::new(candidate.name.clone(), report, &freq))
}

// ---------------------------------------------------------------------------
// Compiled document
// ---------------------------------------------------------------------------

/// Summary of every run sharing a category and origin kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    #[serde(rename = "cipher")]
    pub category: String,
    #[serde(rename = "source_type")]
    pub origin: OriginKind,
    pub num_runs: usize,
    pub summary: Summary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_directory: PathBuf,
    pub total_runs: usize,
    /// Runs compiled per category directory that exists.
    #[serde(rename = "runs_per_cipher")]
    pub runs_per_category: BTreeMap<String, usize>,
}

/// The compiler's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub description: String,
    #[serde(rename = "ciphers")]
    pub categories: Vec<String>,
    #[serde(rename = "nist_tests")]
    pub test_names: Vec<TestName>,
    pub metadata: DocumentMetadata,
    pub runs: Vec<RunRecord>,
    /// Keyed by [`corpus_key`].
    pub global_summary: BTreeMap<String, CorpusSummary>,
}

/// `<category>_<origin>`, e.g. `blowfish_encrypted`.
pub fn corpus_key(category: &str, origin: OriginKind) -> String {
    format!("{category}_{origin}")
}

impl CompiledDocument {
    /// Combine finished run records into a document and compute the corpus
    /// summaries. Runs are grouped by the category parsed from their name.
    pub fn assemble(
        source_directory: &Path,
        layout: &ReportLayout,
        runs_per_category: BTreeMap<String, usize>,
        runs: Vec<RunRecord>,
    ) -> Self {
        let mut global_summary = BTreeMap::new();

        for category in &layout.categories {
            for origin in OriginKind::ALL {
                let matching: Vec<&RunRecord> = runs
                    .iter()
                    .filter(|r| {
                        r.identity.category.as_deref() == Some(category.as_str())
                            && r.identity.origin == Some(origin)
                    })
                    .collect();
                if matching.is_empty() {
                    continue;
                }

                let summary = Summary::from_rows(matching.iter().flat_map(|r| r.tests.iter()));
                global_summary.insert(
                    corpus_key(category, origin),
                    CorpusSummary {
                        category: category.clone(),
                        origin,
                        num_runs: matching.len(),
                        summary,
                    },
                );
            }
        }

        Self {
            description: DOCUMENT_DESCRIPTION.to_string(),
            categories: layout.categories.clone(),
            test_names: layout.test_names.clone(),
            metadata: DocumentMetadata {
                source_directory: source_directory.to_path_buf(),
                total_runs: runs.len(),
                runs_per_category,
            },
            runs,
            global_summary,
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DigestError::io(parent, e))?;
            }
        }
        fs::write(path, json).map_err(|e| DigestError::io(path, e))
    }

    /// Load a previously written document.
    pub fn read_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| DigestError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Compile every run under `root`.
///
/// Never fails: missing categories, missing reports and undecodable rows are
/// logged and skipped.
pub fn compile(root: &Path, layout: &ReportLayout) -> CompiledDocument {
    let mut runs = Vec::new();
    let mut runs_per_category = BTreeMap::new();

    for group in locate_runs(root, layout) {
        let before = runs.len();
        for candidate in &group.candidates {
            if let Some(record) = compile_run(candidate, layout) {
                log::info!(
                    "{}/{}: {} rows, {} with data",
                    candidate.category,
                    candidate.name,
                    record.summary.total_test_rows,
                    record.summary.rows_with_data
                );
                runs.push(record);
            }
        }
        let compiled = runs.len() - before;
        log::info!("{}: {compiled} run(s)", group.category);
        runs_per_category.insert(group.category, compiled);
    }

    CompiledDocument::assemble(root, layout, runs_per_category, runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
------------------------------------------------------------------------------
RESULTS FOR THE UNIFORMITY OF P-VALUES AND THE PROPORTION OF PASSING SEQUENCES
------------------------------------------------------------------------------
   generator is <data/des/encrypted_des_1.bin>
------------------------------------------------------------------------------
 C1  C2  C3  C4  C5  C6  C7  C8  C9 C10  P-VALUE  P-VALUE(KS)  PROPORTION  STATISTICAL TEST
------------------------------------------------------------------------------
 10  12   8   9  11  10  10   9  11  10  0.911413  0.534146    0.9900    Frequency
 10  12   8   9  11  10  10   9  11  10  0.000100 *  0.534146  0.9700    Runs
  0   0   0   0   0   0   0   0   0   0     ----      ----      ----    RandomExcursions
";

    fn write_run(dir: &Path, report: Option<&str>, freq: Option<&str>) {
        fs::create_dir_all(dir).unwrap();
        if let Some(r) = report {
            fs::write(dir.join("finalAnalysisReport.txt"), r).unwrap();
        }
        if let Some(f) = freq {
            fs::write(dir.join("freq.txt"), f).unwrap();
        }
    }

    #[test]
    fn test_parse_report() {
        let report = parse_report(REPORT, &TestName::ALL);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.dropped_rows, 0);
        assert_eq!(
            report.header.generator.as_deref(),
            Some("data/des/encrypted_des_1.bin")
        );
    }

    #[test]
    fn test_run_record_identity_from_name() {
        let record = RunRecord::new(
            "encrypted_des_1",
            parse_report(REPORT, &TestName::ALL),
            &FrequencyFile::default(),
        );
        assert_eq!(record.identity.category.as_deref(), Some("des"));
        assert_eq!(record.identity.origin, Some(OriginKind::Encrypted));
        assert_eq!(record.bit_statistics, None);
        assert_eq!(record.summary.rows_with_data, 2);
        assert_eq!(record.summary.pass_rate, Some(0.5));
    }

    #[test]
    fn test_compile_run_without_report_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("encrypted_des_1");
        write_run(&dir, None, Some("BITSREAD = 8 0s = 4 1s = 4"));
        let candidate = RunCandidate {
            category: "des".to_string(),
            name: "encrypted_des_1".to_string(),
            path: dir,
        };
        assert!(compile_run(&candidate, &ReportLayout::default()).is_none());
    }

    #[test]
    fn test_compile_run_reads_frequency() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("des_from_text_4");
        write_run(
            &dir,
            Some(REPORT),
            Some("ALPHA = 0.01\nBITSREAD = 8 0s = 3 1s = 5\n"),
        );
        let candidate = RunCandidate {
            category: "des".to_string(),
            name: "des_from_text_4".to_string(),
            path: dir,
        };
        let record = compile_run(&candidate, &ReportLayout::default()).unwrap();
        let bits = record.bit_statistics.unwrap();
        assert_eq!(bits.total_bits, 8);
        assert_eq!(bits.zero_ratio, Some(0.375));
        assert_eq!(record.identity.origin, Some(OriginKind::FromText));
    }

    #[test]
    fn test_compile_groups_by_category_and_origin() {
        let tmp = tempfile::tempdir().unwrap();
        let des = tmp.path().join("des");
        write_run(&des.join("encrypted_des_1"), Some(REPORT), None);
        write_run(&des.join("encrypted_des_2"), Some(REPORT), None);
        write_run(&des.join("des_from_text_1"), Some(REPORT), None);
        write_run(&des.join("no_report_here"), None, None);
        write_run(&des.join("oddly_named"), Some(REPORT), None);

        let layout = ReportLayout::with_categories(["blowfish", "des"]);
        let doc = compile(tmp.path(), &layout);

        assert_eq!(doc.metadata.total_runs, 4);
        assert_eq!(doc.metadata.runs_per_category.get("des"), Some(&4));
        assert!(!doc.metadata.runs_per_category.contains_key("blowfish"));
        assert_eq!(doc.categories, vec!["blowfish", "des"]);
        assert_eq!(doc.test_names.len(), 15);

        let keys: Vec<&str> = doc.global_summary.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["des_encrypted", "des_from_text"]);

        let enc = &doc.global_summary["des_encrypted"];
        assert_eq!(enc.num_runs, 2);
        assert_eq!(enc.summary.total_test_rows, 6);
        assert_eq!(enc.summary.rows_no_data, 2);
        assert_eq!(enc.summary.pass_rate, Some(0.5));

        // The unnamed run is compiled but belongs to no corpus.
        let odd = doc.runs.iter().find(|r| r.run_name == "oddly_named").unwrap();
        assert_eq!(odd.identity, RunIdentity::default());
    }

    #[test]
    fn test_document_json_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(&tmp.path().join("rc4/encrypted_rc4_9"), Some(REPORT), None);
        let layout = ReportLayout::default();
        let doc = compile(tmp.path(), &layout);

        let out = tmp.path().join("out/nested/doc.json");
        doc.write_to(&out).unwrap();
        let back = CompiledDocument::read_from(&out).unwrap();
        assert_eq!(back, doc);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let run = &json["runs"][0];
        assert_eq!(run["run_name"], "encrypted_rc4_9");
        assert_eq!(run["cipher"], "rc4");
        assert_eq!(run["source_type"], "encrypted");
        assert_eq!(run["seed"], 9);
        assert!(run["sample_size"].is_null());
        assert_eq!(json["nist_tests"][6], "FFT");
        assert_eq!(json["metadata"]["runs_per_cipher"]["rc4"], 1);
        assert_eq!(json["global_summary"]["rc4_encrypted"]["cipher"], "rc4");
    }

    #[test]
    fn test_write_to_unwritable_destination_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let doc = compile(tmp.path(), &ReportLayout::default());
        let err = doc.write_to(&blocker.join("doc.json")).unwrap_err();
        assert!(matches!(err, DigestError::Io { .. }));
    }

    #[test]
    fn test_corpus_key() {
        assert_eq!(corpus_key("cast", OriginKind::FromText), "cast_from_text");
    }
}
