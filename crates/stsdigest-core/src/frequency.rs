//! `freq.txt` parsing and bit-balance summary.
//!
//! The frequency test writes one line per sequence:
//!
//! ```text
//! ALPHA = 0.010000
//! BITSREAD = 8388608 0s = 4194012 1s = 4194596
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ALPHA\s*=\s*([\d.]+)").expect("invalid ALPHA_RE pattern"));
static BITSREAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"BITSREAD\s*=\s*(\d+)\s+0s\s*=\s*(\d+)\s+1s\s*=\s*(\d+)")
        .expect("invalid BITSREAD_RE pattern")
});

/// Bit counts of one tested sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencySample {
    pub bitsread: u64,
    pub zeros: u64,
    pub ones: u64,
}

/// Contents of a frequency companion file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyFile {
    /// Significance level; the first `ALPHA` line wins.
    pub alpha: Option<f64>,
    /// Samples in file order.
    pub samples: Vec<FrequencySample>,
}

/// Aggregate bit balance over every sample of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencySummary {
    pub alpha: Option<f64>,
    pub num_sequences: usize,
    /// Length of the first sequence.
    pub bits_per_sequence: u64,
    /// Totals are widened so that summing per-sample `u64` counts cannot
    /// overflow.
    pub total_bits: u128,
    pub total_zeros: u128,
    pub total_ones: u128,
    /// `total_zeros / total_bits`; absent when no bits were counted.
    pub zero_ratio: Option<f64>,
}

/// Parse frequency file text.
pub fn parse_frequency(content: &str) -> FrequencyFile {
    let mut file = FrequencyFile::default();
    let mut alpha_seen = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Only the first ALPHA line counts, even when its value is malformed.
        if !alpha_seen {
            if let Some(caps) = ALPHA_RE.captures(line) {
                alpha_seen = true;
                file.alpha = caps.get(1).and_then(|m| m.as_str().parse().ok());
            }
        }

        if let Some(sample) = BITSREAD_RE.captures(line).and_then(|caps| {
            Some(FrequencySample {
                bitsread: caps.get(1)?.as_str().parse().ok()?,
                zeros: caps.get(2)?.as_str().parse().ok()?,
                ones: caps.get(3)?.as_str().parse().ok()?,
            })
        }) {
            file.samples.push(sample);
        }
    }

    file
}

/// Read and parse a frequency file. A missing or unreadable file yields an
/// empty [`FrequencyFile`].
pub fn read_frequency_file(path: &Path) -> FrequencyFile {
    match std::fs::read(path) {
        Ok(bytes) => parse_frequency(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to read {}: {e}", path.display());
            }
            FrequencyFile::default()
        }
    }
}

impl FrequencyFile {
    /// `None` when the file held no samples.
    pub fn summary(&self) -> Option<FrequencySummary> {
        let first = self.samples.first()?;
        let total_zeros: u128 = self.samples.iter().map(|s| u128::from(s.zeros)).sum();
        let total_ones: u128 = self.samples.iter().map(|s| u128::from(s.ones)).sum();
        let total_bits = total_zeros + total_ones;
        let zero_ratio = (total_bits > 0).then(|| total_zeros as f64 / total_bits as f64);

        Some(FrequencySummary {
            alpha: self.alpha,
            num_sequences: self.samples.len(),
            bits_per_sequence: first.bitsread,
            total_bits,
            total_zeros,
            total_ones,
            zero_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREQ: &str = "\
-------------------------------------------
\tFREQUENCY TEST
-------------------------------------------
\tALPHA = 0.010000
\tBITSREAD = 1000 0s = 480 1s = 520
\tBITSREAD = 1000 0s = 510 1s = 490
ALPHA = 0.050000
BITSREAD = 1000 0s = 500 1s = 500
BITSREAD = 1000 0s = ?? 1s = 500
";

    #[test]
    fn test_first_alpha_wins_and_samples_in_order() {
        let f = parse_frequency(FREQ);
        assert_eq!(f.alpha, Some(0.01));
        assert_eq!(
            f.samples,
            vec![
                FrequencySample { bitsread: 1000, zeros: 480, ones: 520 },
                FrequencySample { bitsread: 1000, zeros: 510, ones: 490 },
                FrequencySample { bitsread: 1000, zeros: 500, ones: 500 },
            ]
        );
    }

    #[test]
    fn test_summary() {
        let s = parse_frequency(FREQ).summary().unwrap();
        assert_eq!(s.num_sequences, 3);
        assert_eq!(s.bits_per_sequence, 1000);
        assert_eq!(s.total_zeros, 1490);
        assert_eq!(s.total_ones, 1510);
        assert_eq!(s.total_bits, 3000);
        assert_eq!(s.zero_ratio, Some(1490.0 / 3000.0));
        assert_eq!(s.alpha, Some(0.01));
    }

    #[test]
    fn test_empty_file_has_no_summary() {
        let f = parse_frequency("ALPHA = 0.01\n");
        assert_eq!(f.alpha, Some(0.01));
        assert!(f.summary().is_none());
    }

    #[test]
    fn test_zero_bits_has_no_ratio() {
        let s = parse_frequency("BITSREAD = 0 0s = 0 1s = 0").summary().unwrap();
        assert_eq!(s.total_bits, 0);
        assert_eq!(s.zero_ratio, None);
    }

    #[test]
    fn test_malformed_first_alpha_still_wins() {
        let f = parse_frequency("ALPHA = 1.2.3\nALPHA = 0.05\nBITSREAD = 8 0s = 4 1s = 4\n");
        assert_eq!(f.alpha, None);
        assert_eq!(f.samples.len(), 1);
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        let f = parse_frequency(
            "BITSREAD = 1 0s = 18446744073709551615 1s = 1\n\
             BITSREAD = 1 0s = 18446744073709551615 1s = 18446744073709551615\n",
        );
        let s = f.summary().unwrap();
        let max = u128::from(u64::MAX);
        assert_eq!(s.total_zeros, 2 * max);
        assert_eq!(s.total_ones, max + 1);
        assert_eq!(s.total_bits, 3 * max + 1);
        assert!(s.zero_ratio.is_some_and(|r| r > 0.66 && r < 0.67));

        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"total_bits\":55340232221128654846"), "{json}");
        let back: FrequencySummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let f = read_frequency_file(&tmp.path().join("freq.txt"));
        assert_eq!(f, FrequencyFile::default());
    }

    #[test]
    fn test_read_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("freq.txt");
        std::fs::write(&path, FREQ).unwrap();
        assert_eq!(read_frequency_file(&path).samples.len(), 3);
    }
}
