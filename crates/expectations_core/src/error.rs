//! Error types for batch construction and validation.
//!
//! Rule failures are not errors: they are recorded in a [`ValidationResult`].
//! The types here cover malformed input ([`BatchError`]), malformed rules
//! ([`EngineFault`]) and the blocking call sites ([`ValidationError`],
//! [`StageError`]).

use crate::ValidationResult;
use thiserror::Error;

/// Errors raised while assembling a [`Batch`](crate::Batch).
#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    /// Two columns share a name
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A column's length differs from the first column
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A row-major record has the wrong number of cells
    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Internal faults while evaluating a rule.
///
/// These indicate a broken rule definition, never bad data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineFault {
    /// Tolerance outside `[0, 1]`
    #[error("Rule '{rule}' has tolerance {value}, expected a value in [0, 1]")]
    InvalidTolerance { rule: String, value: f64 },

    /// Lower bound above upper bound, or a NaN bound
    #[error("Rule '{rule}' has invalid bounds: {message}")]
    InvalidBounds { rule: String, message: String },

    /// Custom predicate name not registered
    #[error("Rule '{rule}' references unknown predicate '{predicate}'")]
    UnknownPredicate { rule: String, predicate: String },

    /// Custom predicate parameter is unusable
    #[error("Rule '{rule}' has invalid parameter '{param}': {message}")]
    InvalidParameter {
        rule: String,
        param: String,
        message: String,
    },

    /// A predicate or evaluation worker panicked
    #[error("Rule evaluation panicked: {0}")]
    WorkerPanicked(String),
}

impl EngineFault {
    pub fn bounds(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBounds {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn parameter(
        rule: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            rule: rule.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}

/// A blocking validation failure carrying the full result.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}: {result}")]
pub struct ValidationError {
    pub message: String,
    pub result: Box<ValidationResult>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, result: ValidationResult) -> Self {
        Self {
            message: message.into(),
            result: Box::new(result),
        }
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }
}

/// Errors surfaced by the stage-level wrappers.
#[derive(Debug, Error)]
pub enum StageError {
    /// Rules failed and the caller asked for blocking behavior
    #[error(transparent)]
    Failed(#[from] ValidationError),

    /// The engine could not evaluate the suite
    #[error("Internal validation error: {0}")]
    Internal(#[from] EngineFault),
}

impl StageError {
    /// The validation result, when the error is a rule failure.
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            StageError::Failed(err) => Some(err.result()),
            StageError::Internal(_) => None,
        }
    }
}
