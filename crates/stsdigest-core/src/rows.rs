//! Results-table row classification and decoding.
//!
//! A data row of `finalAnalysisReport.txt` looks like
//!
//! ```text
//!  C1  C2  C3  C4  C5  C6  C7  C8  C9 C10  P-VALUE  P-VALUE(KS)  PROPORTION  STATISTICAL TEST
//!   5   4   3   2   1   0   1   2   3   4  0.123456  0.234567 *  0.987654    Frequency
//!   0   0   0   0   0   0   0   0   0   0      ----      ----        ----    RandomExcursions
//! ```
//!
//! Ten bucket counts of the per-sequence p-value histogram are followed by
//! three criteria (uniformity of p-values, Kolmogorov-Smirnov p-value,
//! proportion of passing sequences). A criterion that failed is followed by a
//! separate `*` token. Tests that produced no sequences print an all-zero
//! histogram and `----` sentinels.
//!
//! Classification runs line by line and never fails: lines that are not rows
//! are reported as such, and rows that cannot be decoded are dropped by
//! [`scan_rows`].

use std::fmt;
use std::iter::Peekable;

use serde::{Deserialize, Serialize};

use crate::error::DigestError;
use crate::layout::TestName;

/// Token printed after a criterion value that failed.
pub const FAILURE_MARKER: &str = "*";

/// Placeholder printed where a criterion has no value.
pub const NO_DATA_SENTINEL: &str = "----";

/// Number of histogram buckets (C1..C10).
pub const BUCKET_COUNT: usize = 10;

/// Minimum tokens of a decodable data-present row: ten buckets plus three values.
const MIN_ROW_TOKENS: usize = BUCKET_COUNT + 3;

// ---------------------------------------------------------------------------
// Row model
// ---------------------------------------------------------------------------

/// One judged quantity of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub value: f64,
    pub passed: bool,
}

/// The three criteria of a data-present row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criteria {
    /// Chi-square uniformity of the per-sequence p-values.
    pub uniformity: Criterion,
    /// Kolmogorov-Smirnov p-value.
    pub ks: Criterion,
    /// Proportion of sequences that passed.
    pub proportion: Criterion,
}

impl Criteria {
    pub fn all_passed(&self) -> bool {
        self.uniformity.passed && self.ks.passed && self.proportion.passed
    }

    fn iter(&self) -> [Criterion; 3] {
        [self.uniformity, self.ks, self.proportion]
    }
}

/// A decoded results-table row.
///
/// `criteria` is `None` exactly when the battery printed sentinels; such rows
/// always carry an all-zero histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RowFields", try_from = "RowFields")]
pub struct OutcomeRow {
    pub test: TestName,
    pub buckets: [u64; BUCKET_COUNT],
    pub criteria: Option<Criteria>,
}

impl OutcomeRow {
    pub fn no_data(test: TestName) -> Self {
        Self {
            test,
            buckets: [0; BUCKET_COUNT],
            criteria: None,
        }
    }

    pub fn data_available(&self) -> bool {
        self.criteria.is_some()
    }

    /// `None` for no-data rows.
    pub fn all_passed(&self) -> Option<bool> {
        self.criteria.as_ref().map(Criteria::all_passed)
    }
}

/// Renders the row in report grammar, so that [`parse_row`] reads it back.
impl fmt::Display for OutcomeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in &self.buckets {
            write!(f, "{count:>4}")?;
        }
        match &self.criteria {
            Some(criteria) => {
                for c in criteria.iter() {
                    let marker = if c.passed { " " } else { FAILURE_MARKER };
                    write!(f, "  {:>9} {marker}", c.value)?;
                }
            }
            None => {
                for _ in 0..3 {
                    write!(f, "  {NO_DATA_SENTINEL:>9}  ")?;
                }
            }
        }
        write!(f, "  {}", self.test)
    }
}

/// Flat JSON shape of a row.
#[derive(Serialize, Deserialize)]
struct RowFields {
    test_name: TestName,
    c1_c10: [u64; BUCKET_COUNT],
    p_value_uniformity: Option<f64>,
    p_value_uniformity_passed: Option<bool>,
    p_value_ks: Option<f64>,
    p_value_ks_passed: Option<bool>,
    proportion: Option<f64>,
    proportion_passed: Option<bool>,
    data_available: bool,
}

impl From<OutcomeRow> for RowFields {
    fn from(row: OutcomeRow) -> Self {
        let c = row.criteria;
        Self {
            test_name: row.test,
            c1_c10: row.buckets,
            p_value_uniformity: c.map(|c| c.uniformity.value),
            p_value_uniformity_passed: c.map(|c| c.uniformity.passed),
            p_value_ks: c.map(|c| c.ks.value),
            p_value_ks_passed: c.map(|c| c.ks.passed),
            proportion: c.map(|c| c.proportion.value),
            proportion_passed: c.map(|c| c.proportion.passed),
            data_available: c.is_some(),
        }
    }
}

impl TryFrom<RowFields> for OutcomeRow {
    type Error = DigestError;

    fn try_from(f: RowFields) -> Result<Self, Self::Error> {
        let inconsistent = |reason| DigestError::InconsistentRow {
            test: f.test_name.to_string(),
            reason,
        };
        let pairs = [
            (f.p_value_uniformity, f.p_value_uniformity_passed),
            (f.p_value_ks, f.p_value_ks_passed),
            (f.proportion, f.proportion_passed),
        ];

        if !f.data_available {
            if pairs.iter().any(|(v, p)| v.is_some() || p.is_some()) {
                return Err(inconsistent("no-data row carries criterion fields"));
            }
            if f.c1_c10.iter().any(|&c| c != 0) {
                return Err(inconsistent("no-data row carries non-zero buckets"));
            }
            return Ok(Self::no_data(f.test_name));
        }

        let mut criteria = [Criterion {
            value: 0.0,
            passed: false,
        }; 3];
        for (slot, pair) in criteria.iter_mut().zip(pairs) {
            match pair {
                (Some(value), Some(passed)) => *slot = Criterion { value, passed },
                _ => return Err(inconsistent("data row is missing a criterion field")),
            }
        }
        let [uniformity, ks, proportion] = criteria;
        Ok(Self {
            test: f.test_name,
            buckets: f.c1_c10,
            criteria: Some(Criteria {
                uniformity,
                ks,
                proportion,
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a single report line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Runs of `-` or `=`.
    Separator,
    /// `RESULTS FOR ...`
    Banner,
    /// `generator is <...>`
    Generator,
    /// `C1  C2 ... STATISTICAL TEST`
    ColumnHeader,
    /// Part of a `minimum pass rate` clause.
    PassRate,
    /// Part of a `sample size` clause.
    SampleSize,
    /// Trailing guidance / addendum text.
    Guidance,
    /// A results row for the given test.
    Row(TestName),
    /// Anything else.
    Other,
}

/// Classify one report line against the recognized test names.
///
/// Exclusion rules are applied before name matching, in the order of
/// [`LineKind`]'s variants.
pub fn classify_line(line: &str, test_names: &[TestName]) -> LineKind {
    let line = line.trim_end();
    let trimmed = line.trim_start();

    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed
        .chars()
        .all(|c| c == '-' || c == '=' || c.is_whitespace())
    {
        LineKind::Separator
    } else if line.contains("RESULTS FOR") {
        LineKind::Banner
    } else if line.contains("generator is") {
        LineKind::Generator
    } else if line.contains("C1") && line.contains("C2") && line.contains("STATISTICAL TEST") {
        LineKind::ColumnHeader
    } else if line.contains("minimum pass rate") {
        LineKind::PassRate
    } else if line.contains("sample size") {
        LineKind::SampleSize
    } else if line.contains("further guidelines")
        || line.contains("MAPLE")
        || line.contains("addendum")
    {
        LineKind::Guidance
    } else {
        match match_test_name(line, test_names) {
            Some(test) => LineKind::Row(test),
            None => LineKind::Other,
        }
    }
}

/// The first name (in `test_names` order) the line ends with, provided the
/// name starts the line or follows whitespace. `BlockFrequency` therefore
/// never matches `Frequency`.
pub fn match_test_name(line: &str, test_names: &[TestName]) -> Option<TestName> {
    let line = line.trim_end();
    test_names.iter().copied().find(|test| {
        line.strip_suffix(test.as_str())
            .is_some_and(|head| head.is_empty() || head.ends_with(char::is_whitespace))
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Why a classified row was dropped.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("line does not end with {0}")]
    NameMismatch(TestName),

    #[error("expected at least {min} tokens, found {0}", min = MIN_ROW_TOKENS)]
    TooFewTokens(usize),

    #[error("bucket count '{0}' is not a non-negative integer")]
    Bucket(String),

    #[error("missing {0} value")]
    MissingValue(&'static str),

    #[error("{which} value '{token}' is not a decimal")]
    Value { which: &'static str, token: String },
}

/// Decode a row already classified as belonging to `test`.
pub fn parse_row(line: &str, test: TestName) -> Result<OutcomeRow, RowError> {
    let data = line
        .trim_end()
        .strip_suffix(test.as_str())
        .ok_or(RowError::NameMismatch(test))?
        .trim_end();

    if is_no_data(data) {
        return Ok(OutcomeRow::no_data(test));
    }

    let tokens: Vec<&str> = data.split_whitespace().collect();
    if tokens.len() < MIN_ROW_TOKENS {
        return Err(RowError::TooFewTokens(tokens.len()));
    }

    let mut buckets = [0u64; BUCKET_COUNT];
    for (slot, token) in buckets.iter_mut().zip(&tokens[..BUCKET_COUNT]) {
        *slot = token
            .parse()
            .map_err(|_| RowError::Bucket((*token).to_string()))?;
    }

    let mut rest = tokens[BUCKET_COUNT..].iter().copied().peekable();
    let uniformity = next_criterion(&mut rest, "uniformity")?;
    let ks = next_criterion(&mut rest, "KS")?;
    let proportion = next_criterion(&mut rest, "proportion")?;

    Ok(OutcomeRow {
        test,
        buckets,
        criteria: Some(Criteria {
            uniformity,
            ks,
            proportion,
        }),
    })
}

/// One decimal token, optionally followed by the failure marker.
fn next_criterion<'a, I>(
    tokens: &mut Peekable<I>,
    which: &'static str,
) -> Result<Criterion, RowError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(RowError::MissingValue(which))?;
    let value = token.parse::<f64>().map_err(|_| RowError::Value {
        which,
        token: token.to_string(),
    })?;
    let passed = tokens.next_if_eq(&FAILURE_MARKER).is_none();
    Ok(Criterion { value, passed })
}

/// A segment is "no data" when it holds sentinels and, apart from them, only
/// dashes, zeros and whitespace, with the buckets before the first sentinel
/// summing to zero.
fn is_no_data(data: &str) -> bool {
    if !data.contains(NO_DATA_SENTINEL) {
        return false;
    }
    let residue = data.replace(NO_DATA_SENTINEL, "");
    if !residue
        .chars()
        .all(|c| c == '-' || c == '0' || c.is_whitespace())
    {
        return false;
    }
    let head = data.split(NO_DATA_SENTINEL).next().unwrap_or_default();
    let bucket_sum: u64 = head
        .split_whitespace()
        .filter_map(|t| t.parse::<u64>().ok())
        .take(BUCKET_COUNT)
        .sum();
    bucket_sum == 0
}

/// Rows recovered from a report body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowScan {
    pub rows: Vec<OutcomeRow>,
    /// Lines classified as rows that failed to decode.
    pub dropped: usize,
}

/// Classify every line and decode the rows, in report order.
pub fn scan_rows(content: &str, test_names: &[TestName]) -> RowScan {
    let mut scan = RowScan::default();
    for (idx, line) in content.lines().enumerate() {
        let LineKind::Row(test) = classify_line(line, test_names) else {
            continue;
        };
        match parse_row(line, test) {
            Ok(row) => scan.rows.push(row),
            Err(e) => {
                log::debug!("dropping {test} row at line {}: {e}", idx + 1);
                scan.dropped += 1;
            }
        }
    }
    scan
}
