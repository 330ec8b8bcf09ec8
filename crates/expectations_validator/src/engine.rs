//! Main validation engine.
//!
//! [`Validator`] runs every rule of a [`Suite`] against a [`Batch`] and folds
//! the per-rule outcomes into a [`ValidationResult`]. It holds no mutable
//! state, so one value can serve any number of concurrent validations.

use crate::{PredicateRegistry, evaluate};
use expectations_core::{
    Batch, EngineFault, FailedRule, Rule, RuleOutcome, Suite, ValidationResult,
    ValidationStatistics,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::debug;

/// Executes suites against batches.
///
/// # Example
///
/// ```rust
/// use expectations_core::{Batch, RuleBuilder, Suite};
/// use expectations_validator::Validator;
///
/// let batch = Batch::builder()
///     .column("OverallQual", [7, 6, 11])
///     .build()
///     .unwrap();
/// let suite = Suite::builder("quality")
///     .rule(RuleBuilder::between("OverallQual", 1.0, 10.0).build())
///     .build();
///
/// let result = Validator::new().validate(&batch, &suite).unwrap();
/// assert!(!result.success);
/// assert_eq!(result.failed_rules[0].observed.unexpected_rows, vec![2]);
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    predicates: Arc<PredicateRegistry>,
    parallelism: usize,
}

impl Validator {
    /// Creates a sequential validator with the built-in predicates.
    pub fn new() -> Self {
        Self::with_registry(PredicateRegistry::with_builtins())
    }

    /// Creates a validator resolving custom rules against `registry`.
    pub fn with_registry(registry: PredicateRegistry) -> Self {
        Self {
            predicates: Arc::new(registry),
            parallelism: 1,
        }
    }

    /// Sets the number of worker threads. Values below 1 are treated as 1.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.predicates
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Validates a batch against a suite.
    ///
    /// Failing data is reported in the returned result. `Err` is reserved for
    /// rules that cannot be evaluated at all.
    pub fn validate(&self, batch: &Batch, suite: &Suite) -> Result<ValidationResult, EngineFault> {
        let start = Instant::now();

        let outcomes = if self.parallelism > 1 && suite.len() > 1 {
            self.evaluate_parallel(batch, suite.rules())?
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| {
                evaluate_chunk(suite.rules(), batch, &self.predicates)
            }))
            .map_err(|payload| EngineFault::WorkerPanicked(panic_message(payload.as_ref())))??
        };

        let result = build_result(suite, &outcomes);
        debug!(
            suite = suite.name(),
            evaluated = result.statistics.evaluated,
            unsuccessful = result.statistics.unsuccessful,
            duration_ms = start.elapsed().as_millis() as u64,
            "Suite evaluated"
        );
        Ok(result)
    }

    /// Evaluates contiguous chunks of rules on scoped threads, reassembling
    /// the outcomes in suite order.
    fn evaluate_parallel(
        &self,
        batch: &Batch,
        rules: &[Rule],
    ) -> Result<Vec<RuleOutcome>, EngineFault> {
        let chunk_size = rules.len().div_ceil(self.parallelism);
        let predicates = self.predicates.as_ref();

        let joined: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = rules
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || evaluate_chunk(chunk, batch, predicates)))
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut outcomes = Vec::with_capacity(rules.len());
        for chunk in joined {
            let chunk =
                chunk.map_err(|payload| EngineFault::WorkerPanicked(panic_message(payload.as_ref())))?;
            outcomes.extend(chunk?);
        }
        Ok(outcomes)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn evaluate_chunk(
    rules: &[Rule],
    batch: &Batch,
    predicates: &PredicateRegistry,
) -> Result<Vec<RuleOutcome>, EngineFault> {
    rules
        .iter()
        .map(|rule| evaluate(rule, batch, predicates))
        .collect()
}

/// Folds outcomes (in suite order) into statistics and the failed-rule list.
fn build_result(suite: &Suite, outcomes: &[RuleOutcome]) -> ValidationResult {
    let mut statistics = ValidationStatistics::default();
    let mut failed_rules = Vec::new();

    for (rule, outcome) in suite.rules().iter().zip(outcomes) {
        statistics.record(outcome.success);
        if !outcome.success {
            failed_rules.push(FailedRule::new(rule, outcome));
        }
    }

    ValidationResult::new(suite.name(), statistics, failed_rules)
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PredicateInput;
    use expectations_core::{ColumnSetMode, RuleBuilder};
    use pretty_assertions::assert_eq;

    fn batch() -> Batch {
        Batch::builder()
            .column("a", [1, 2, 3, 4])
            .column("b", [0, 2, 5, 1])
            .build()
            .unwrap()
    }

    fn suite() -> Suite {
        Suite::builder("engine")
            .rule(RuleBuilder::column_set(["a", "b"], ColumnSetMode::Exact).build())
            .rule(RuleBuilder::not_null("a").build())
            .rule(RuleBuilder::between("a", 1.0, 3.0).build())
            .rule(RuleBuilder::between("a", 1.0, 3.0).mostly(0.75).named("a_mostly").build())
            .rule(RuleBuilder::pair_gte("a", "b").build())
            .rule(RuleBuilder::not_null("missing").build())
            .build()
    }

    #[test]
    fn test_statistics_and_failures() {
        let result = Validator::new().validate(&batch(), &suite()).unwrap();

        assert!(!result.success);
        assert_eq!(result.suite_name, "engine");
        assert_eq!(result.statistics.evaluated, 6);
        assert_eq!(result.statistics.successful, 4);
        assert_eq!(result.statistics.unsuccessful, 2);

        let names: Vec<&str> = result.failed_rules.iter().map(|f| f.rule_name.as_str()).collect();
        assert_eq!(names, vec!["value_between:a", "column_pair_gte:a,b"]);
        assert_eq!(result.failed_rules[1].observed.unexpected_rows, vec![2]);
    }

    #[test]
    fn test_empty_suite_passes() {
        let result = Validator::new()
            .validate(&batch(), &Suite::builder("empty").build())
            .unwrap();
        assert!(result.success);
        assert_eq!(result.statistics.evaluated, 0);
        assert_eq!(result.statistics.success_fraction, 1.0);
    }

    #[test]
    fn test_deterministic() {
        let validator = Validator::new();
        let first = validator.validate(&batch(), &suite()).unwrap();
        for _ in 0..5 {
            assert_eq!(validator.validate(&batch(), &suite()).unwrap(), first);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = Validator::new().validate(&batch(), &suite()).unwrap();
        for workers in [2, 3, 4, 16] {
            let parallel = Validator::new()
                .with_parallelism(workers)
                .validate(&batch(), &suite())
                .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn test_fault_propagates() {
        let suite = Suite::builder("broken")
            .rule(RuleBuilder::not_null("a").build())
            .rule(RuleBuilder::custom("no_such_predicate", "a").build())
            .build();

        for workers in [1, 2] {
            let err = Validator::new()
                .with_parallelism(workers)
                .validate(&batch(), &suite)
                .unwrap_err();
            assert!(matches!(err, EngineFault::UnknownPredicate { .. }));
        }
    }

    #[test]
    fn test_worker_panic_becomes_fault() {
        let mut registry = PredicateRegistry::new();
        registry.register("explodes", |_: &PredicateInput<'_>| panic!("predicate bug"));
        let suite = Suite::builder("panics")
            .rule(RuleBuilder::not_null("a").build())
            .rule(RuleBuilder::custom("explodes", "a").build())
            .build();

        let validator = Validator::with_registry(registry);
        for workers in [1, 2] {
            let err = validator
                .clone()
                .with_parallelism(workers)
                .validate(&batch(), &suite)
                .unwrap_err();
            assert_eq!(err, EngineFault::WorkerPanicked("predicate bug".to_string()));
        }
    }
}
