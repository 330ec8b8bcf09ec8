//! Custom business predicates.
//!
//! A predicate recomputes an expected value from other columns of the batch
//! and compares it to the rule's target column, row by row. Predicates are
//! registered by name in a [`PredicateRegistry`]; rules refer to them through
//! [`Expectation::CustomPredicate`](expectations_core::Expectation).
//!
//! Derivation predicates pass every row when their context columns are absent
//! from the batch, so a stage can be validated on partial data without
//! spurious failures.

use expectations_core::columns::{NEVER_REMODELED, YEAR_BUILT, YEAR_REMOD_ADD, YEAR_SOLD};
use expectations_core::{Batch, Column, DataValue, EngineFault};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// `LotAge == YrSold - YearBuilt`
pub const DERIVED_AGE_CONSISTENCY: &str = "derived_age_consistency";

/// `YearsSinceRemod == -1` if never remodeled, else `YrSold - YearRemodAdd`
pub const DERIVED_REMODEL_CONSISTENCY: &str = "derived_remodel_consistency";

/// Target within `[0, max_age]`
pub const BOUNDED_AGE: &str = "bounded_age";

/// Default `max_age` for [`BOUNDED_AGE`].
pub const DEFAULT_MAX_AGE: f64 = 200.0;

/// Everything a predicate may read.
pub struct PredicateInput<'a> {
    /// Name of the rule being evaluated, for fault messages
    pub rule: &'a str,
    pub batch: &'a Batch,
    /// The rule's target column
    pub column: &'a Column,
    pub params: &'a BTreeMap<String, f64>,
}

/// A predicate body: one pass/fail flag per batch row.
pub type PredicateFn =
    dyn Fn(&PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> + Send + Sync;

/// Validates a rule's parameters before any data is read.
pub type ParamCheckFn = dyn Fn(&str, &BTreeMap<String, f64>) -> Result<(), EngineFault> + Send + Sync;

#[derive(Clone)]
struct Entry {
    predicate: Arc<PredicateFn>,
    check: Option<Arc<ParamCheckFn>>,
}

/// Named predicate functions available to custom rules.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Entry>,
}

impl PredicateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the housing predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DERIVED_AGE_CONSISTENCY, derived_age_consistency);
        registry.register(DERIVED_REMODEL_CONSISTENCY, derived_remodel_consistency);
        registry.register_checked(BOUNDED_AGE, bounded_age, |rule, params| {
            max_age(rule, params).map(|_| ())
        });
        registry
    }

    /// Registers or replaces a predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> + Send + Sync + 'static,
    {
        let entry = Entry {
            predicate: Arc::new(predicate),
            check: None,
        };
        self.predicates.insert(name.into(), entry);
    }

    /// Registers a predicate whose parameters are validated up front by `check`.
    pub fn register_checked<F, C>(&mut self, name: impl Into<String>, predicate: F, check: C)
    where
        F: Fn(&PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> + Send + Sync + 'static,
        C: Fn(&str, &BTreeMap<String, f64>) -> Result<(), EngineFault> + Send + Sync + 'static,
    {
        let entry = Entry {
            predicate: Arc::new(predicate),
            check: Some(Arc::new(check)),
        };
        self.predicates.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name).map(|entry| entry.predicate.as_ref())
    }

    /// Resolves `name` and validates `params` for the rule `rule`.
    pub fn check(
        &self,
        rule: &str,
        name: &str,
        params: &BTreeMap<String, f64>,
    ) -> Result<(), EngineFault> {
        let entry = self
            .predicates
            .get(name)
            .ok_or_else(|| EngineFault::UnknownPredicate {
                rule: rule.to_string(),
                predicate: name.to_string(),
            })?;
        match &entry.check {
            Some(check) => check(rule, params),
            None => Ok(()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.names())
            .finish()
    }
}

fn numeric(column: &Column, row: usize) -> Option<f64> {
    column
        .get(row)
        .filter(|v| !v.is_missing())
        .and_then(DataValue::as_float)
}

/// Checks the target against `YrSold - YearBuilt`.
pub fn derived_age_consistency(input: &PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> {
    let rows = input.batch.row_count();
    let (Some(sold), Some(built)) = (
        input.batch.column(YEAR_SOLD),
        input.batch.column(YEAR_BUILT),
    ) else {
        return Ok(vec![true; rows]);
    };

    Ok((0..rows)
        .map(|row| {
            match (numeric(sold, row), numeric(built, row), numeric(input.column, row)) {
                (Some(s), Some(b), Some(actual)) => actual == s - b,
                _ => false,
            }
        })
        .collect())
}

/// Checks the target against the years-since-remodel derivation.
pub fn derived_remodel_consistency(input: &PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> {
    let rows = input.batch.row_count();
    let (Some(sold), Some(built), Some(remod)) = (
        input.batch.column(YEAR_SOLD),
        input.batch.column(YEAR_BUILT),
        input.batch.column(YEAR_REMOD_ADD),
    ) else {
        return Ok(vec![true; rows]);
    };

    Ok((0..rows)
        .map(|row| {
            let (Some(s), Some(b), Some(r), Some(actual)) = (
                numeric(sold, row),
                numeric(built, row),
                numeric(remod, row),
                numeric(input.column, row),
            ) else {
                return false;
            };
            let expected = if r == b {
                NEVER_REMODELED as f64
            } else {
                s - r
            };
            actual == expected
        })
        .collect())
}

fn max_age(rule: &str, params: &BTreeMap<String, f64>) -> Result<f64, EngineFault> {
    let max_age = params.get("max_age").copied().unwrap_or(DEFAULT_MAX_AGE);
    if !max_age.is_finite() || max_age < 0.0 {
        return Err(EngineFault::parameter(
            rule,
            "max_age",
            format!("expected a non-negative finite number, got {}", max_age),
        ));
    }
    Ok(max_age)
}

/// Checks the target lies in `[0, max_age]`.
pub fn bounded_age(input: &PredicateInput<'_>) -> Result<Vec<bool>, EngineFault> {
    let max_age = max_age(input.rule, input.params)?;
    Ok((0..input.batch.row_count())
        .map(|row| numeric(input.column, row).is_some_and(|age| (0.0..=max_age).contains(&age)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use expectations_core::columns::{LOT_AGE, YEARS_SINCE_REMOD};
    use pretty_assertions::assert_eq;

    fn run(
        predicate: fn(&PredicateInput<'_>) -> Result<Vec<bool>, EngineFault>,
        batch: &Batch,
        target: &str,
        params: &BTreeMap<String, f64>,
    ) -> Result<Vec<bool>, EngineFault> {
        predicate(&PredicateInput {
            rule: "test",
            batch,
            column: batch.column(target).unwrap(),
            params,
        })
    }

    fn context() -> Batch {
        Batch::builder()
            .column(YEAR_BUILT, [2003, 1976, 2001])
            .column(YEAR_REMOD_ADD, [2003, 1976, 2002])
            .column(YEAR_SOLD, [2008, 2007, 2008])
            .build()
            .unwrap()
    }

    #[test]
    fn test_age_consistency() {
        let batch = context()
            .with_column(Column::new(LOT_AGE, [5, 31, 8]))
            .unwrap();
        let passed = run(derived_age_consistency, &batch, LOT_AGE, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![true, true, false]);
    }

    #[test]
    fn test_age_consistency_without_context_passes() {
        let batch = Batch::builder().column(LOT_AGE, [5, 999]).build().unwrap();
        let passed = run(derived_age_consistency, &batch, LOT_AGE, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![true, true]);
    }

    #[test]
    fn test_remodel_consistency_uses_sentinel() {
        let batch = context()
            .with_column(Column::new(YEARS_SINCE_REMOD, [-1, -1, 6]))
            .unwrap();
        let passed =
            run(derived_remodel_consistency, &batch, YEARS_SINCE_REMOD, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![true, true, true]);

        let wrong = context()
            .with_column(Column::new(YEARS_SINCE_REMOD, [5, -1, -1]))
            .unwrap();
        let passed =
            run(derived_remodel_consistency, &wrong, YEARS_SINCE_REMOD, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![false, true, false]);
    }

    #[test]
    fn test_remodel_consistency_without_context_passes() {
        let batch = context()
            .without_column(YEAR_REMOD_ADD)
            .with_column(Column::new(YEARS_SINCE_REMOD, [42, 42, 42]))
            .unwrap();
        let passed =
            run(derived_remodel_consistency, &batch, YEARS_SINCE_REMOD, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![true; 3]);
    }

    #[test]
    fn test_bounded_age_default_and_param() {
        let batch = Batch::builder()
            .column(LOT_AGE, [-5.0, 0.0, 150.0, 200.0, 250.0])
            .build()
            .unwrap();

        let passed = run(bounded_age, &batch, LOT_AGE, &BTreeMap::new()).unwrap();
        assert_eq!(passed, vec![false, true, true, true, false]);

        let params = BTreeMap::from([("max_age".to_string(), 100.0)]);
        let passed = run(bounded_age, &batch, LOT_AGE, &params).unwrap();
        assert_eq!(passed, vec![false, true, false, false, false]);
    }

    #[test]
    fn test_bounded_age_rejects_negative_limit() {
        let batch = Batch::builder().column(LOT_AGE, [1]).build().unwrap();
        let params = BTreeMap::from([("max_age".to_string(), -1.0)]);
        assert!(matches!(
            run(bounded_age, &batch, LOT_AGE, &params),
            Err(EngineFault::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_registry() {
        let mut registry = PredicateRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![BOUNDED_AGE, DERIVED_AGE_CONSISTENCY, DERIVED_REMODEL_CONSISTENCY]
        );

        registry.register("always", |input: &PredicateInput<'_>| {
            Ok(vec![true; input.batch.row_count()])
        });
        assert!(registry.contains("always"));
        assert!(registry.get("never").is_none());
    }

    #[test]
    fn test_registry_checks_params_without_data() {
        let registry = PredicateRegistry::with_builtins();
        let bad = BTreeMap::from([("max_age".to_string(), f64::INFINITY)]);

        assert!(registry.check("age", BOUNDED_AGE, &BTreeMap::new()).is_ok());
        assert!(matches!(
            registry.check("age", BOUNDED_AGE, &bad),
            Err(EngineFault::InvalidParameter { .. })
        ));
        assert!(registry.check("age", DERIVED_AGE_CONSISTENCY, &bad).is_ok());
        assert!(matches!(
            registry.check("age", "never", &BTreeMap::new()),
            Err(EngineFault::UnknownPredicate { .. })
        ));
    }
}
