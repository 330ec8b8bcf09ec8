//! Post-hoc scans that are not expressed as rules.
//!
//! Model-ready data must not contain a single missing or non-finite value,
//! regardless of which column it sits in. [`HygieneReport::scan`] checks the
//! whole batch in one pass; the stage wrapper forces the result to failed when
//! the report is not clean.
//!
//! [`remodel_age_inconsistencies`] is a warning-only diagnostic for engineered
//! features.

use expectations_core::Batch;
use expectations_core::columns::{LOT_AGE, NEVER_REMODELED, YEARS_SINCE_REMOD};
use serde::Serialize;
use std::fmt;

/// Counts of values that make a batch unfit for a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HygieneReport {
    /// Null or NaN cells
    pub missing_values: usize,
    /// Positive or negative infinity
    pub non_finite_values: usize,
    /// Columns holding at least one offending cell, in batch order
    pub affected_columns: Vec<String>,
}

impl HygieneReport {
    /// Scans every cell of the batch.
    pub fn scan(batch: &Batch) -> Self {
        let mut report = Self::default();

        for column in batch.columns() {
            let missing = column.values().iter().filter(|v| v.is_missing()).count();
            let infinite = column.values().iter().filter(|v| v.is_infinite()).count();

            report.missing_values += missing;
            report.non_finite_values += infinite;
            if missing + infinite > 0 {
                report.affected_columns.push(column.name().to_string());
            }
        }

        report
    }

    pub fn is_clean(&self) -> bool {
        self.missing_values == 0 && self.non_finite_values == 0
    }
}

impl fmt::Display for HygieneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "no missing or non-finite values");
        }
        write!(
            f,
            "{} missing and {} non-finite values in [{}]",
            self.missing_values,
            self.non_finite_values,
            self.affected_columns.join(", ")
        )
    }
}

/// Rows where the house was remodeled more years ago than it was built.
///
/// Rows using the never-remodeled sentinel, or with either value missing, are
/// not counted. Returns 0 when either derived column is absent.
pub fn remodel_age_inconsistencies(batch: &Batch) -> usize {
    let (Some(age), Some(since_remod)) = (batch.column(LOT_AGE), batch.column(YEARS_SINCE_REMOD))
    else {
        return 0;
    };

    age.values()
        .iter()
        .zip(since_remod.values())
        .filter(|(age, since)| {
            match (age.as_float(), since.as_float()) {
                (Some(age), Some(since)) => since != NEVER_REMODELED as f64 && since > age,
                _ => false,
            }
        })
        .count()
}
