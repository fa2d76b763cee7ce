//! Report header extraction.
//!
//! The header of `finalAnalysisReport.txt` is free-form prose. It names the
//! generator file and, near the bottom of the table, states the minimum pass
//! rate for the proportion criterion twice: once for the general tests and
//! once for the random excursion (variant) tests. The clauses wrap across
//! lines, so all patterns run in dot-matches-newline mode over the whole text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static GENERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"generator is <(.+?)>").expect("invalid GENERATOR_RE pattern"));
static PASS_RATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)minimum pass rate.*?approximately\s*=?\s*([\d.]+)\s*for a\s+sample size\s*=\s*(\d+)",
    )
    .expect("invalid PASS_RATE_RE pattern")
});
static EXCURSION_PASS_RATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)minimum pass rate for the random excursion.*?approximately\s*=?\s*([\d.]+)\s*for a sample size\s*=\s*(\d+)",
    )
    .expect("invalid EXCURSION_PASS_RATE_RE pattern")
});

/// Header facts of one report. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub generator: Option<String>,
    pub sample_size: Option<u64>,
    pub sample_size_random_excursion: Option<u64>,
    pub min_pass_rate: Option<f64>,
    pub min_pass_rate_random_excursion: Option<f64>,
}

/// Extract the generator reference and both threshold clauses.
pub fn extract_header(content: &str) -> ReportHeader {
    let generator = GENERATOR_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let (min_pass_rate, sample_size) = threshold_pair(&PASS_RATE_RE, content);
    let (min_pass_rate_random_excursion, sample_size_random_excursion) =
        threshold_pair(&EXCURSION_PASS_RATE_RE, content);

    ReportHeader {
        generator,
        sample_size,
        sample_size_random_excursion,
        min_pass_rate,
        min_pass_rate_random_excursion,
    }
}

/// `[\d.]+` also matches things like `1.2.3`; those decode to `None`.
fn threshold_pair(re: &Regex, content: &str) -> (Option<f64>, Option<u64>) {
    let Some(caps) = re.captures(content) else {
        return (None, None);
    };
    let rate = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let size = caps.get(2).and_then(|m| m.as_str().parse().ok());
    (rate, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
------------------------------------------------------------------------------
RESULTS FOR THE UNIFORMITY OF P-VALUES AND THE PROPORTION OF PASSING SEQUENCES
------------------------------------------------------------------------------
   generator is <../data/blowfish/encrypted_blowfish_12345.bin>
------------------------------------------------------------------------------
 C1  C2  C3  C4  C5  C6  C7  C8  C9 C10  P-VALUE  PROPORTION  STATISTICAL TEST
------------------------------------------------------------------------------
The minimum pass rate for each statistical test with the exception of the
random excursion (variant) test is approximately = 0.986036 for a
sample size = 8000 binary sequences.

The minimum pass rate for the random excursion (variant) test
is approximately = 0.983210 for a sample size = 4811 binary sequences.
";

    #[test]
    fn test_extracts_all_fields() {
        let h = extract_header(HEADER);
        assert_eq!(
            h.generator.as_deref(),
            Some("../data/blowfish/encrypted_blowfish_12345.bin")
        );
        assert_eq!(h.min_pass_rate, Some(0.986036));
        assert_eq!(h.sample_size, Some(8000));
        assert_eq!(h.min_pass_rate_random_excursion, Some(0.983210));
        assert_eq!(h.sample_size_random_excursion, Some(4811));
    }

    #[test]
    fn test_missing_clauses_are_none() {
        let h = extract_header("nothing to see here\n");
        assert_eq!(h, ReportHeader::default());
    }

    #[test]
    fn test_excursion_clause_alone() {
        let text = "The minimum pass rate for the random excursion (variant) test\n\
                    is approximately 0.9 for a sample size = 10 binary sequences.";
        let h = extract_header(text);
        // The general pattern also matches the first "minimum pass rate".
        assert_eq!(h.min_pass_rate, Some(0.9));
        assert_eq!(h.sample_size, Some(10));
        assert_eq!(h.min_pass_rate_random_excursion, Some(0.9));
        assert_eq!(h.sample_size_random_excursion, Some(10));
    }

    #[test]
    fn test_malformed_decimal_is_none() {
        let text = "minimum pass rate is approximately = 0.9.8 for a sample size = 55";
        let h = extract_header(text);
        assert_eq!(h.min_pass_rate, None);
        assert_eq!(h.sample_size, Some(55));
    }
}
