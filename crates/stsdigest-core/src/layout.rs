//! Fixed vocabulary of a NIST STS results tree.
//!
//! The battery always reports the same fifteen test families, and the runs
//! live under a fixed list of category directories. Both lists are carried in
//! a [`ReportLayout`] value that is handed to every component explicitly, so
//! several compilers with different layouts can run side by side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default category directories (one per cipher under test).
pub const DEFAULT_CATEGORIES: &[&str] = &["blowfish", "cast", "des", "rc4"];

/// Name of the per-run report written by the battery.
pub const DEFAULT_REPORT_FILE: &str = "finalAnalysisReport.txt";

/// Name of the per-run bit-count companion file.
pub const DEFAULT_FREQUENCY_FILE: &str = "freq.txt";

// ---------------------------------------------------------------------------
// Test families
// ---------------------------------------------------------------------------

/// One of the fifteen NIST STS test families, in report order.
///
/// Serializes as the exact name the battery prints in its results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TestName {
    Frequency,
    BlockFrequency,
    CumulativeSums,
    Runs,
    LongestRun,
    Rank,
    #[serde(rename = "FFT")]
    Fft,
    NonOverlappingTemplate,
    OverlappingTemplate,
    Universal,
    ApproximateEntropy,
    RandomExcursions,
    RandomExcursionsVariant,
    Serial,
    LinearComplexity,
}

impl TestName {
    /// Every test family in report order.
    pub const ALL: [TestName; 15] = [
        TestName::Frequency,
        TestName::BlockFrequency,
        TestName::CumulativeSums,
        TestName::Runs,
        TestName::LongestRun,
        TestName::Rank,
        TestName::Fft,
        TestName::NonOverlappingTemplate,
        TestName::OverlappingTemplate,
        TestName::Universal,
        TestName::ApproximateEntropy,
        TestName::RandomExcursions,
        TestName::RandomExcursionsVariant,
        TestName::Serial,
        TestName::LinearComplexity,
    ];

    /// Name as printed in the results table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "Frequency",
            Self::BlockFrequency => "BlockFrequency",
            Self::CumulativeSums => "CumulativeSums",
            Self::Runs => "Runs",
            Self::LongestRun => "LongestRun",
            Self::Rank => "Rank",
            Self::Fft => "FFT",
            Self::NonOverlappingTemplate => "NonOverlappingTemplate",
            Self::OverlappingTemplate => "OverlappingTemplate",
            Self::Universal => "Universal",
            Self::ApproximateEntropy => "ApproximateEntropy",
            Self::RandomExcursions => "RandomExcursions",
            Self::RandomExcursionsVariant => "RandomExcursionsVariant",
            Self::Serial => "Serial",
            Self::LinearComplexity => "LinearComplexity",
        }
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the fifteen test names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTestName(pub String);

impl fmt::Display for UnknownTestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown NIST test name '{}'", self.0)
    }
}

impl std::error::Error for UnknownTestName {}

impl FromStr for TestName {
    type Err = UnknownTestName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTestName(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Layout configuration
// ---------------------------------------------------------------------------

/// Where runs live and what their reports may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Category directories scanned under the source root, in order.
    pub categories: Vec<String>,
    /// Test names recognized in the results table, in match order.
    pub test_names: Vec<TestName>,
    /// Report file name inside each run directory.
    pub report_file: String,
    /// Frequency companion file name inside each run directory.
    pub frequency_file: String,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            test_names: TestName::ALL.to_vec(),
            report_file: DEFAULT_REPORT_FILE.to_string(),
            frequency_file: DEFAULT_FREQUENCY_FILE.to_string(),
        }
    }
}

impl ReportLayout {
    /// Default layout restricted to the given categories.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifteen_names_in_report_order() {
        assert_eq!(TestName::ALL.len(), 15);
        assert_eq!(TestName::ALL[0], TestName::Frequency);
        assert_eq!(TestName::ALL[14], TestName::LinearComplexity);
        let mut sorted = TestName::ALL;
        sorted.sort();
        assert_eq!(sorted, TestName::ALL, "Ord must follow report order");
    }

    #[test]
    fn test_from_str_round_trip() {
        for t in TestName::ALL {
            assert_eq!(t.as_str().parse::<TestName>(), Ok(t));
        }
        assert!("Fft".parse::<TestName>().is_err());
        assert!("frequency".parse::<TestName>().is_err());
    }

    #[test]
    fn test_serde_uses_report_names() {
        assert_eq!(serde_json::to_string(&TestName::Fft).unwrap(), "\"FFT\"");
        let t: TestName = serde_json::from_str("\"RandomExcursionsVariant\"").unwrap();
        assert_eq!(t, TestName::RandomExcursionsVariant);
    }

    #[test]
    fn test_default_layout() {
        let layout = ReportLayout::default();
        assert_eq!(layout.categories, vec!["blowfish", "cast", "des", "rc4"]);
        assert_eq!(layout.test_names.len(), 15);
        assert_eq!(layout.report_file, "finalAnalysisReport.txt");
        assert_eq!(layout.frequency_file, "freq.txt");
    }

    #[test]
    fn test_with_categories_keeps_other_defaults() {
        let layout = ReportLayout::with_categories(["aes"]);
        assert_eq!(layout.categories, vec!["aes"]);
        assert_eq!(layout.report_file, DEFAULT_REPORT_FILE);
    }
}
