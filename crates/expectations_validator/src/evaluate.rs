//! Rule evaluation.
//!
//! [`evaluate`] dispatches on the rule's [`Expectation`] and returns a
//! [`RuleOutcome`]. Column-value rules count per-row passes and compare the
//! pass fraction to the rule's tolerance; table-level rules produce a single
//! pass/fail element. Evaluation is pure: no rule sees another rule's outcome.

use crate::{PredicateInput, PredicateRegistry};
use expectations_core::{
    Batch, Column, ColumnSetMode, DataValue, EngineFault, ExpectedType, Expectation,
    MAX_UNEXPECTED_ROWS, ObservedSummary, Rule, RuleOutcome,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Evaluates one rule against a batch.
///
/// The rule definition is checked first, whatever the batch holds. Rules whose
/// target columns are absent then pass vacuously. An `Err` means the rule
/// definition itself is unusable; failing data is reported through the
/// returned outcome.
pub fn evaluate(
    rule: &Rule,
    batch: &Batch,
    predicates: &PredicateRegistry,
) -> Result<RuleOutcome, EngineFault> {
    check_definition(rule, predicates)?;

    let missing: Vec<&str> = rule
        .target_columns()
        .into_iter()
        .filter(|column| !batch.has_column(column))
        .collect();
    if !missing.is_empty() {
        debug!(rule = %rule.name, missing = ?missing, "Skipping rule, columns not in batch");
        return Ok(RuleOutcome::skipped(format!(
            "column(s) not in batch: {}",
            missing.join(", ")
        )));
    }

    let tolerance = rule.tolerance;
    let outcome = match &rule.expectation {
        Expectation::NotNull { column } => {
            not_null(require(rule, batch, column)?).finish(tolerance)
        }
        Expectation::TypeMatch { column, expected } => {
            type_match(require(rule, batch, column)?, *expected).finish(tolerance)
        }
        Expectation::ValueBetween { column, min, max } => {
            value_between(require(rule, batch, column)?, *min, *max).finish(tolerance)
        }
        Expectation::ColumnPairGte { column_a, column_b } => {
            let a = require(rule, batch, column_a)?;
            let b = require(rule, batch, column_b)?;
            pair_gte(a, b).finish(tolerance)
        }
        Expectation::ColumnSetMatch { columns, mode } => {
            column_set(batch, columns, *mode, tolerance)
        }
        Expectation::RowCountBetween { min, max } => {
            let rows = batch.row_count();
            let ok = min.is_none_or(|lo| rows >= lo) && max.is_none_or(|hi| rows <= hi);
            table_outcome(ok, rows.to_string(), tolerance)
        }
        Expectation::ColumnCountEqual { value } => {
            let count = batch.column_count();
            table_outcome(count == *value, count.to_string(), tolerance)
        }
        Expectation::CustomPredicate {
            predicate,
            column,
            params,
        } => {
            let function =
                predicates
                    .get(predicate)
                    .ok_or_else(|| EngineFault::UnknownPredicate {
                        rule: rule.name.clone(),
                        predicate: predicate.clone(),
                    })?;
            let column = require(rule, batch, column)?;
            let passed = function(&PredicateInput {
                rule: &rule.name,
                batch,
                column,
                params,
            })?;
            if passed.len() != batch.row_count() {
                return Err(EngineFault::parameter(
                    &rule.name,
                    predicate,
                    format!(
                        "predicate returned {} results for {} rows",
                        passed.len(),
                        batch.row_count()
                    ),
                ));
            }
            custom(column, &passed).finish(tolerance)
        }
    };

    debug!(
        rule = %rule.name,
        success = outcome.success,
        pass_fraction = outcome.pass_fraction,
        "Rule evaluated"
    );
    Ok(outcome)
}

/// Rejects rules that could never be evaluated, independent of the data.
fn check_definition(rule: &Rule, predicates: &PredicateRegistry) -> Result<(), EngineFault> {
    check_tolerance(rule)?;
    match &rule.expectation {
        Expectation::ValueBetween { min, max, .. } => check_bounds(rule, *min, *max),
        Expectation::RowCountBetween {
            min: Some(lo),
            max: Some(hi),
        } if lo > hi => Err(EngineFault::bounds(
            &rule.name,
            format!("min {} exceeds max {}", lo, hi),
        )),
        Expectation::CustomPredicate {
            predicate, params, ..
        } => predicates.check(&rule.name, predicate, params),
        _ => Ok(()),
    }
}

fn check_tolerance(rule: &Rule) -> Result<(), EngineFault> {
    if (0.0..=1.0).contains(&rule.tolerance) {
        Ok(())
    } else {
        Err(EngineFault::InvalidTolerance {
            rule: rule.name.clone(),
            value: rule.tolerance,
        })
    }
}

fn check_bounds(rule: &Rule, min: Option<f64>, max: Option<f64>) -> Result<(), EngineFault> {
    if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
        return Err(EngineFault::bounds(&rule.name, "bounds must not be NaN"));
    }
    match (min, max) {
        (None, None) => Err(EngineFault::bounds(&rule.name, "at least one bound is required")),
        (Some(lo), Some(hi)) if lo > hi => Err(EngineFault::bounds(
            &rule.name,
            format!("min {} exceeds max {}", lo, hi),
        )),
        _ => Ok(()),
    }
}

fn require<'a>(rule: &Rule, batch: &'a Batch, name: &str) -> Result<&'a Column, EngineFault> {
    batch
        .column(name)
        .ok_or_else(|| EngineFault::parameter(&rule.name, name, "column not in batch"))
}

/// Per-row pass/fail counts for column-value rules.
#[derive(Debug, Default)]
struct RowTally {
    element_count: usize,
    unexpected_count: usize,
    unexpected_rows: Vec<usize>,
}

impl RowTally {
    fn record(&mut self, row: usize, passed: bool) {
        self.element_count += 1;
        if !passed {
            self.unexpected_count += 1;
            if self.unexpected_rows.len() < MAX_UNEXPECTED_ROWS {
                self.unexpected_rows.push(row);
            }
        }
    }

    /// An empty tally passes vacuously.
    fn finish(self, tolerance: f64) -> RuleOutcome {
        let pass_fraction = if self.element_count == 0 {
            1.0
        } else {
            (self.element_count - self.unexpected_count) as f64 / self.element_count as f64
        };
        RuleOutcome::from_fraction(
            pass_fraction,
            tolerance,
            ObservedSummary {
                element_count: self.element_count,
                unexpected_count: self.unexpected_count,
                unexpected_rows: self.unexpected_rows,
                ..Default::default()
            },
        )
    }
}

fn not_null(column: &Column) -> RowTally {
    let mut tally = RowTally::default();
    for (row, value) in column.values().iter().enumerate() {
        tally.record(row, !value.is_missing());
    }
    tally
}

// Missing values are the not-null rule's concern and are skipped here.
fn type_match(column: &Column, expected: ExpectedType) -> RowTally {
    let mut tally = RowTally::default();
    for (row, value) in column.values().iter().enumerate() {
        if !value.is_missing() {
            tally.record(row, expected.matches(value));
        }
    }
    tally
}

fn value_between(column: &Column, min: Option<f64>, max: Option<f64>) -> RowTally {
    let mut tally = RowTally::default();
    for (row, value) in column.values().iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        let within = value.as_float().is_some_and(|v| {
            min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
        });
        tally.record(row, within);
    }
    tally
}

// A missing or non-numeric operand fails the row.
fn pair_gte(a: &Column, b: &Column) -> RowTally {
    let mut tally = RowTally::default();
    for (row, (left, right)) in a.values().iter().zip(b.values()).enumerate() {
        tally.record(row, compare_gte(left, right).unwrap_or(false));
    }
    tally
}

fn compare_gte(left: &DataValue, right: &DataValue) -> Option<bool> {
    match (left, right) {
        (DataValue::Int(l), DataValue::Int(r)) => Some(l >= r),
        _ if left.is_missing() || right.is_missing() => None,
        _ => Some(left.as_float()? >= right.as_float()?),
    }
}

// Rows with a missing target value are not evaluated.
fn custom(column: &Column, passed: &[bool]) -> RowTally {
    let mut tally = RowTally::default();
    for (row, (value, ok)) in column.values().iter().zip(passed).enumerate() {
        if !value.is_missing() {
            tally.record(row, *ok);
        }
    }
    tally
}

fn column_set(
    batch: &Batch,
    expected: &[String],
    mode: ColumnSetMode,
    tolerance: f64,
) -> RuleOutcome {
    let actual: BTreeSet<&str> = batch.column_names().collect();
    let wanted: BTreeSet<&str> = expected.iter().map(String::as_str).collect();

    let missing: Vec<&str> = wanted.difference(&actual).copied().collect();
    let extra: Vec<&str> = match mode {
        ColumnSetMode::Exact => actual.difference(&wanted).copied().collect(),
        ColumnSetMode::Subset => Vec::new(),
    };

    let ok = missing.is_empty() && extra.is_empty();
    let observed = if ok {
        format!("{} expected columns present", wanted.len())
    } else {
        format!("missing [{}], unexpected [{}]", missing.join(", "), extra.join(", "))
    };
    table_outcome(ok, observed, tolerance)
}

fn table_outcome(ok: bool, observed: String, tolerance: f64) -> RuleOutcome {
    RuleOutcome::from_fraction(
        if ok { 1.0 } else { 0.0 },
        tolerance,
        ObservedSummary {
            element_count: 1,
            unexpected_count: usize::from(!ok),
            observed_value: Some(observed),
            ..Default::default()
        },
    )
}
