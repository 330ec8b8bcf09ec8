//! Error types for the validator's conversion and stage-selection helpers.

use expectations_core::BatchError;
use thiserror::Error;

/// Errors raised while converting an Arrow `RecordBatch` into a [`Batch`](expectations_core::Batch).
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Column type has no `DataValue` counterpart
    #[error("Column '{column}' has unsupported Arrow type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// Array did not downcast to the type its schema declared
    #[error("Failed to downcast column '{column}' to {expected}")]
    Downcast { column: String, expected: String },

    /// The converted columns did not form a valid batch
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl ConversionError {
    pub fn downcast(column: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Downcast {
            column: column.into(),
            expected: expected.into(),
        }
    }
}

/// A stage name that does not match any pipeline stage.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown stage '{0}', expected one of: raw, engineered, test, preprocessed, monitor")]
pub struct UnknownStage(pub String);
