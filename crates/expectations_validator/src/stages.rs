//! Stage-level entry points.
//!
//! Blocking stages (`raw`, `engineered`, `test`, `preprocessed`) return
//! `Err(StageError::Failed)` when `fail_on_error` is set and any rule fails;
//! the error carries the full result. The monitoring stage never returns an
//! error: faults and panics are logged and swallowed.

use crate::engine::panic_message;
use crate::hygiene::{HygieneReport, remodel_age_inconsistencies};
use crate::suites::{
    ENGINEERED_SUITE, MONITORING_SUITE, PREPROCESSED_SUITE, RAW_SUITE, TEST_SUITE,
    engineered_features_suite, monitoring_suite, preprocessed_features_suite, raw_data_suite,
};
use crate::{UnknownStage, Validator};
use expectations_core::{
    Batch, EngineFault, StageError, Suite, ValidationError, ValidationResult, ValidationSettings,
};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use tracing::{error, info, warn};

/// A pipeline stage with its own suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Raw,
    Engineered,
    /// Prediction input: the raw suite without the target column
    Test,
    Preprocessed,
    Monitor,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Raw,
        Stage::Engineered,
        Stage::Test,
        Stage::Preprocessed,
        Stage::Monitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Engineered => "engineered",
            Stage::Test => "test",
            Stage::Preprocessed => "preprocessed",
            Stage::Monitor => "monitor",
        }
    }

    /// Whether a failure in this stage should stop the caller.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Stage::Monitor)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Runs the stage suites with blocking or monitoring semantics.
///
/// # Example
///
/// ```rust
/// use expectations_core::{Batch, ValidationSettings};
/// use expectations_validator::StageValidator;
///
/// let batch = Batch::builder()
///     .column("LotArea", [8450, 9600])
///     .column("YearBuilt", [2003, 1776])
///     .build()
///     .unwrap();
///
/// let stages = StageValidator::new(ValidationSettings::new().with_current_year(2010));
/// let err = stages.validate_raw(&batch, false, true).unwrap_err();
/// let failed: Vec<&str> = err
///     .validation_result()
///     .unwrap()
///     .failed_rules
///     .iter()
///     .map(|f| f.rule_name.as_str())
///     .collect();
/// assert_eq!(failed.len(), 2);
/// assert!(failed.contains(&"value_between:YearBuilt"));
///
/// assert!(stages.monitor(&batch).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct StageValidator {
    validator: Validator,
    settings: ValidationSettings,
    derivation_checks: bool,
}

impl StageValidator {
    /// Creates stage wrappers using `settings.parallelism` worker threads.
    pub fn new(settings: ValidationSettings) -> Self {
        let validator = Validator::new().with_parallelism(settings.parallelism);
        Self::with_validator(validator, settings)
    }

    pub fn with_validator(validator: Validator, settings: ValidationSettings) -> Self {
        Self {
            validator,
            settings,
            derivation_checks: false,
        }
    }

    /// Adds the derived-value recomputation rules to the engineered suite.
    pub fn with_derivation_checks(mut self, enabled: bool) -> Self {
        self.derivation_checks = enabled;
        self
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The suite a stage evaluates.
    ///
    /// `include_target` is ignored by stages that never reference the target.
    pub fn suite_for(
        &self,
        stage: Stage,
        include_target: bool,
        expected_feature_count: Option<usize>,
    ) -> Suite {
        match stage {
            Stage::Raw => raw_data_suite(RAW_SUITE, include_target, &self.settings),
            Stage::Engineered => engineered_features_suite(
                ENGINEERED_SUITE,
                include_target,
                self.derivation_checks,
                &self.settings,
            ),
            Stage::Test => raw_data_suite(TEST_SUITE, false, &self.settings),
            Stage::Preprocessed => preprocessed_features_suite(
                PREPROCESSED_SUITE,
                expected_feature_count,
                &self.settings,
            ),
            Stage::Monitor => monitoring_suite(MONITORING_SUITE, &self.settings),
        }
    }

    /// Validates raw CSV data.
    pub fn validate_raw(
        &self,
        batch: &Batch,
        include_target: bool,
        fail_on_error: bool,
    ) -> Result<ValidationResult, StageError> {
        let suite = self.suite_for(Stage::Raw, include_target, None);
        self.validate_suite(batch, &suite, fail_on_error, "Raw data validation failed")
    }

    /// Validates engineered features.
    ///
    /// Also logs a warning, without failing, when `YearsSinceRemod` exceeds
    /// `LotAge` on any row.
    pub fn validate_engineered(
        &self,
        batch: &Batch,
        include_target: bool,
        fail_on_error: bool,
    ) -> Result<ValidationResult, StageError> {
        let suite = self.suite_for(Stage::Engineered, include_target, None);
        let result = self.run(batch, &suite)?;

        let inconsistent = remodel_age_inconsistencies(batch);
        if inconsistent > 0 {
            warn!(
                rows = inconsistent,
                "Found rows where YearsSinceRemod > LotAge"
            );
        }

        conclude(result, fail_on_error, "Engineered features validation failed")
    }

    /// Validates prediction input (no target column).
    pub fn validate_test(
        &self,
        batch: &Batch,
        fail_on_error: bool,
    ) -> Result<ValidationResult, StageError> {
        let suite = self.suite_for(Stage::Test, false, None);
        self.validate_suite(batch, &suite, fail_on_error, "Test data validation failed")
    }

    /// Validates a model-ready feature matrix.
    ///
    /// After the declarative rules, the whole batch is scanned for missing and
    /// non-finite values; either forces the result to failed.
    pub fn validate_preprocessed(
        &self,
        batch: &Batch,
        expected_feature_count: Option<usize>,
        fail_on_error: bool,
    ) -> Result<ValidationResult, StageError> {
        let suite = self.suite_for(Stage::Preprocessed, false, expected_feature_count);
        let mut result = self.run(batch, &suite)?;
        let hygiene = HygieneReport::scan(batch);
        if !hygiene.is_clean() {
            error!(%hygiene, "Preprocessed data contains unusable values");
            result = result.mark_failed();
        }

        conclude(result, fail_on_error, "Preprocessed data validation failed")
    }

    /// Runs an arbitrary suite through the blocking path.
    pub fn validate_suite(
        &self,
        batch: &Batch,
        suite: &Suite,
        fail_on_error: bool,
        failure_message: &str,
    ) -> Result<ValidationResult, StageError> {
        let result = self.run(batch, suite)?;
        conclude(result, fail_on_error, failure_message)
    }

    fn run(&self, batch: &Batch, suite: &Suite) -> Result<ValidationResult, EngineFault> {
        info!(
            suite = suite.name(),
            rows = batch.row_count(),
            columns = batch.column_count(),
            "Validating batch"
        );
        self.validator.validate(batch, suite)
    }

    /// Runs the monitoring suite, surfacing engine faults.
    pub fn try_monitor(&self, batch: &Batch) -> Result<ValidationResult, EngineFault> {
        let suite = self.suite_for(Stage::Monitor, false, None);
        self.validator.validate(batch, &suite)
    }

    /// Runs the monitoring suite without ever failing the caller.
    ///
    /// Returns `None` when the suite could not be evaluated; the cause is
    /// logged at warn level.
    pub fn monitor(&self, batch: &Batch) -> Option<ValidationResult> {
        match catch_unwind(AssertUnwindSafe(|| self.try_monitor(batch))) {
            Ok(Ok(result)) => {
                if !result.success {
                    warn!(
                        failed = result.statistics.unsuccessful,
                        summary = %result.failure_summary(),
                        "Monitoring validation failed"
                    );
                }
                Some(result)
            }
            Ok(Err(fault)) => {
                warn!(error = %fault, "Monitoring validation error");
                None
            }
            Err(payload) => {
                warn!(
                    error = %panic_message(payload.as_ref()),
                    "Monitoring validation panicked"
                );
                None
            }
        }
    }
}

impl Default for StageValidator {
    fn default() -> Self {
        Self::new(ValidationSettings::default())
    }
}

/// Logs the outcome and applies blocking semantics.
fn conclude(
    result: ValidationResult,
    fail_on_error: bool,
    failure_message: &str,
) -> Result<ValidationResult, StageError> {
    if result.success {
        info!(suite = %result.suite_name, "{}", result);
        return Ok(result);
    }

    error!(suite = %result.suite_name, "{}\n{}", result, result.failure_summary());
    if fail_on_error {
        Err(ValidationError::new(failure_message, result).into())
    } else {
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expectations_core::RuleBuilder;
    use expectations_core::columns::{LOT_AGE, YEARS_SINCE_REMOD};
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, buffer.contents())
    }

    fn stages() -> StageValidator {
        StageValidator::new(ValidationSettings::new().with_current_year(2010))
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!("raw".parse::<Stage>().unwrap(), Stage::Raw);
        assert_eq!("Monitor".parse::<Stage>().unwrap(), Stage::Monitor);
        assert_eq!(
            "live".parse::<Stage>().unwrap_err(),
            UnknownStage("live".to_string())
        );
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert!(!Stage::Monitor.is_blocking());
    }

    #[test]
    fn test_non_blocking_returns_failed_result() {
        let batch = Batch::builder().column("OverallQual", [0]).build().unwrap();
        let result = stages().validate_raw(&batch, false, false).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn test_internal_fault_is_distinct() {
        let batch = Batch::builder().column("a", [1]).build().unwrap();
        let suite = Suite::builder("broken")
            .rule(RuleBuilder::between("a", 5.0, 1.0).build())
            .build();

        let err = stages()
            .validate_suite(&batch, &suite, true, "Broken suite failed")
            .unwrap_err();
        assert!(matches!(err, StageError::Internal(EngineFault::InvalidBounds { .. })));
        assert!(err.validation_result().is_none());
        assert!(err.to_string().starts_with("Internal validation error"));
    }

    #[test]
    fn test_blocking_error_message() {
        let batch = Batch::builder().column("OverallCond", [11]).build().unwrap();
        let err = stages().validate_test(&batch, true).unwrap_err();
        assert!(err.to_string().starts_with("Test data validation failed: ✗"));
        assert_eq!(err.validation_result().unwrap().suite_name, TEST_SUITE);
    }

    #[test]
    fn test_monitor_swallows_faults() {
        let batch = Batch::builder().column("LotArea", [1]).build().unwrap();
        let mut settings = ValidationSettings::new().with_current_year(2010);
        settings.monitoring_lot_area_max = -1.0;

        assert!(StageValidator::new(settings.clone()).try_monitor(&batch).is_err());
        assert_eq!(StageValidator::new(settings).monitor(&batch), None);
    }

    #[test]
    fn test_remodel_warning_logged_when_blocking_fails() {
        let batch = Batch::builder()
            .column(LOT_AGE, [-5, 31, 7])
            .column(YEARS_SINCE_REMOD, [5, -1, 9])
            .build()
            .unwrap();

        for fail_on_error in [true, false] {
            let (outcome, logs) =
                captured_logs(|| stages().validate_engineered(&batch, false, fail_on_error));

            let result = match outcome {
                Ok(result) => result,
                Err(err) => err.validation_result().unwrap().clone(),
            };
            assert!(!result.success);
            assert!(logs.contains("Found rows where YearsSinceRemod > LotAge"));
            assert!(logs.contains("rows=2"));
        }
    }

    #[test]
    fn test_accessors_reflect_settings() {
        let stages = StageValidator::new(
            ValidationSettings::new()
                .with_current_year(2010)
                .with_parallelism(3),
        );

        assert_eq!(stages.settings().current_year, Some(2010));
        assert_eq!(stages.validator().parallelism(), 3);
        assert!(stages.validator().registry().contains("bounded_age"));
    }
}
