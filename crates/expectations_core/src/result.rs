//! Validation outcome types.
//!
//! A [`RuleOutcome`] is produced per rule; the engine folds outcomes into a
//! [`ValidationResult`] holding rule-level statistics and the failed-rule list.

use crate::{Rule, RuleKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of unexpected row indices retained per rule.
pub const MAX_UNEXPECTED_ROWS: usize = 20;

/// What a rule observed while evaluating a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedSummary {
    /// Rows (or, for table-level rules, checks) considered
    pub element_count: usize,

    /// Elements that failed the check
    pub unexpected_count: usize,

    /// First failing row indices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unexpected_rows: Vec<usize>,

    /// Aggregate observation for table-level rules (e.g. the row count)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<String>,

    /// Set when the rule passed vacuously because columns were absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
}

impl fmt::Display for ObservedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.skipped_reason {
            return write!(f, "skipped ({})", reason);
        }
        if let Some(observed) = &self.observed_value {
            return write!(f, "observed {}", observed);
        }
        write!(
            f,
            "{} of {} values unexpected",
            self.unexpected_count, self.element_count
        )?;
        if !self.unexpected_rows.is_empty() {
            let rows: Vec<String> = self.unexpected_rows.iter().map(|r| r.to_string()).collect();
            write!(f, " (rows {})", rows.join(", "))?;
        }
        Ok(())
    }
}

/// The outcome of evaluating one rule against one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// `pass_fraction >= tolerance`
    pub success: bool,
    /// Fraction of evaluated elements that passed
    pub pass_fraction: f64,
    pub details: ObservedSummary,
}

impl RuleOutcome {
    /// Builds an outcome from a pass fraction and the rule's tolerance.
    pub fn from_fraction(pass_fraction: f64, tolerance: f64, details: ObservedSummary) -> Self {
        Self {
            success: pass_fraction >= tolerance,
            pass_fraction,
            details,
        }
    }

    /// A vacuously passing outcome for a rule whose columns are absent.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            pass_fraction: 1.0,
            details: ObservedSummary {
                skipped_reason: Some(reason.into()),
                ..Default::default()
            },
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.details.skipped_reason.is_some()
    }
}

/// Details recorded for a failed rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRule {
    pub rule_name: String,
    pub rule_kind: RuleKind,
    pub target_columns: Vec<String>,
    pub parameters: serde_json::Value,
    pub tolerance: f64,
    pub pass_fraction: f64,
    pub observed: ObservedSummary,
}

impl FailedRule {
    pub fn new(rule: &Rule, outcome: &RuleOutcome) -> Self {
        Self {
            rule_name: rule.name.clone(),
            rule_kind: rule.kind(),
            target_columns: rule
                .target_columns()
                .into_iter()
                .map(String::from)
                .collect(),
            parameters: rule.expectation.parameters(),
            tolerance: rule.tolerance,
            pass_fraction: outcome.pass_fraction,
            observed: outcome.details.clone(),
        }
    }

    fn target_label(&self) -> String {
        if self.target_columns.is_empty() {
            "table".to_string()
        } else {
            format!("column '{}'", self.target_columns.join("', '"))
        }
    }
}

/// Rule-level counts (not rows).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub evaluated: usize,
    pub successful: usize,
    pub unsuccessful: usize,
    pub success_fraction: f64,
}

impl Default for ValidationStatistics {
    fn default() -> Self {
        Self {
            evaluated: 0,
            successful: 0,
            unsuccessful: 0,
            success_fraction: 1.0,
        }
    }
}

impl ValidationStatistics {
    /// Counts one rule outcome.
    pub fn record(&mut self, success: bool) {
        self.evaluated += 1;
        if success {
            self.successful += 1;
        } else {
            self.unsuccessful += 1;
        }
        self.refresh_fraction();
    }

    /// Combines two partial tallies. Commutative and associative.
    pub fn merge(self, other: Self) -> Self {
        let mut merged = Self {
            evaluated: self.evaluated + other.evaluated,
            successful: self.successful + other.successful,
            unsuccessful: self.unsuccessful + other.unsuccessful,
            success_fraction: 1.0,
        };
        merged.refresh_fraction();
        merged
    }

    fn refresh_fraction(&mut self) {
        self.success_fraction = if self.evaluated == 0 {
            1.0
        } else {
            self.successful as f64 / self.evaluated as f64
        };
    }
}

/// The outcome of running a suite against a batch.
///
/// # Example
///
/// ```rust
/// use expectations_core::{ValidationResult, ValidationStatistics};
///
/// let result = ValidationResult::new("empty", ValidationStatistics::default(), Vec::new());
/// assert!(result.success);
/// assert_eq!(result.failure_summary(), "No failures");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub suite_name: String,
    pub success: bool,
    pub statistics: ValidationStatistics,
    pub failed_rules: Vec<FailedRule>,
}

impl ValidationResult {
    /// Builds a result; `success` is derived from the failed-rule list.
    pub fn new(
        suite_name: impl Into<String>,
        statistics: ValidationStatistics,
        failed_rules: Vec<FailedRule>,
    ) -> Self {
        Self {
            suite_name: suite_name.into(),
            success: failed_rules.is_empty(),
            statistics,
            failed_rules,
        }
    }

    /// Forces the overall flag to failed, leaving rule-level details untouched.
    ///
    /// Used by post-hoc scans that are not expressed as rules.
    pub fn mark_failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Multi-line listing of every failed rule.
    pub fn failure_summary(&self) -> String {
        if self.success {
            return "No failures".to_string();
        }
        if self.failed_rules.is_empty() {
            return "Validation failed outside of declared rules".to_string();
        }

        let mut lines = vec![format!(
            "Validation Failures ({} rules):",
            self.failed_rules.len()
        )];
        for (i, failure) in self.failed_rules.iter().enumerate() {
            lines.push(format!(
                "  {}. {} on {}",
                i + 1,
                failure.rule_kind,
                failure.target_label()
            ));
            lines.push(format!(
                "     Details: {} (pass fraction {:.4} < mostly {})",
                failure.observed, failure.pass_fraction, failure.tolerance
            ));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(
                f,
                "✓ Validation passed ({}/{} rules)",
                self.statistics.successful, self.statistics.evaluated
            )
        } else {
            write!(
                f,
                "✗ Validation failed ({} rules failed)",
                self.statistics.unsuccessful
            )
        }
    }
}
