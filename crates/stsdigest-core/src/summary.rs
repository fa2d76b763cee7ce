//! Pass/fail tallies over outcome rows.
//!
//! The same fold serves a single run and a whole corpus: a corpus summary is
//! the summary of the concatenated rows of its runs, never a combination of
//! per-run summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::TestName;
use crate::rows::OutcomeRow;

/// Per-test-name breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestTally {
    /// Rows of this test, with or without data.
    pub count: usize,
    pub with_data: usize,
    pub passed_all_criteria: usize,
    pub failed_uniformity: usize,
    pub failed_ks: usize,
    pub failed_proportion: usize,
    /// Mean proportion over data-present rows; `0.0` when `with_data == 0`.
    pub avg_proportion: f64,
    /// Mean KS p-value over data-present rows; `0.0` when `with_data == 0`.
    pub avg_p_value_ks: f64,
}

impl TestTally {
    /// Mean proportion, or `None` when no row carried data.
    pub fn mean_proportion(&self) -> Option<f64> {
        (self.with_data > 0).then_some(self.avg_proportion)
    }

    /// Mean KS p-value, or `None` when no row carried data.
    pub fn mean_p_value_ks(&self) -> Option<f64> {
        (self.with_data > 0).then_some(self.avg_p_value_ks)
    }
}

/// Summary of a run or corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_test_rows: usize,
    pub rows_with_data: usize,
    pub rows_no_data: usize,
    pub rows_passed_all_criteria: usize,
    pub rows_failed_any_criterion: usize,
    /// `rows_passed_all_criteria / rows_with_data`; absent without data rows.
    pub pass_rate: Option<f64>,
    pub per_test_summary: BTreeMap<TestName, TestTally>,
}

impl Summary {
    /// Fold rows into a summary.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a OutcomeRow>,
    {
        let mut acc = SummaryAccumulator::default();
        for row in rows {
            acc.push(row);
        }
        acc.finish()
    }
}

/// Running state of the fold. Means are kept as sums until [`finish`].
///
/// [`finish`]: SummaryAccumulator::finish
#[derive(Debug, Clone, Default)]
pub struct SummaryAccumulator {
    summary: Summary,
}

impl SummaryAccumulator {
    pub fn push(&mut self, row: &OutcomeRow) {
        let s = &mut self.summary;
        s.total_test_rows += 1;

        let tally = s.per_test_summary.entry(row.test).or_default();
        tally.count += 1;

        let Some(criteria) = &row.criteria else {
            s.rows_no_data += 1;
            return;
        };

        s.rows_with_data += 1;
        tally.with_data += 1;
        if criteria.all_passed() {
            s.rows_passed_all_criteria += 1;
            tally.passed_all_criteria += 1;
        } else {
            s.rows_failed_any_criterion += 1;
        }
        if !criteria.uniformity.passed {
            tally.failed_uniformity += 1;
        }
        if !criteria.ks.passed {
            tally.failed_ks += 1;
        }
        if !criteria.proportion.passed {
            tally.failed_proportion += 1;
        }
        tally.avg_proportion += criteria.proportion.value;
        tally.avg_p_value_ks += criteria.ks.value;
    }

    pub fn finish(self) -> Summary {
        let mut s = self.summary;
        if s.rows_with_data > 0 {
            s.pass_rate = Some(s.rows_passed_all_criteria as f64 / s.rows_with_data as f64);
        }
        for tally in s.per_test_summary.values_mut() {
            if tally.with_data > 0 {
                tally.avg_proportion /= tally.with_data as f64;
                tally.avg_p_value_ks /= tally.with_data as f64;
            }
        }
        s
    }
}
