//! Error types for plotfit.

use ndarray::ShapeError;
use thiserror::Error;

/// Result type alias for plotfit operations.
pub type Result<T> = std::result::Result<T, PlotFitError>;

/// Errors that can occur in plotfit operations.
#[derive(Error, Debug)]
pub enum PlotFitError {
    /// The outcome column was not specified.
    #[error("Configuration error: an outcome column must be specified")]
    MissingOutcome,
    /// A named column does not exist in the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// A column name appears more than once.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    /// Invalid parameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Invalid input data.
    #[error("Invalid input data: {0}")]
    InvalidInput(String),
    /// Shape mismatch in arrays.
    #[error("Shape mismatch: expected {expected_shape}, got {actual_shape}")]
    ShapeMismatch {
        expected_shape: String,
        actual_shape: String,
    },
    /// The model has not been trained yet.
    #[error("Model is not trained yet")]
    ModelNotTrained,
    /// An error occurred during plotting.
    #[error("Plotting error: {0}")]
    PlottingError(String),
    /// An IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// A serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PlotFitError {
    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        PlotFitError::ShapeMismatch {
            expected_shape: expected.into(),
            actual_shape: actual.into(),
        }
    }
}

impl From<ShapeError> for PlotFitError {
    fn from(err: ShapeError) -> Self {
        PlotFitError::ShapeMismatch {
            expected_shape: "unknown".to_string(),
            actual_shape: err.to_string(),
        }
    }
}

impl From<std::io::Error> for PlotFitError {
    fn from(err: std::io::Error) -> Self {
        PlotFitError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PlotFitError {
    fn from(err: serde_json::Error) -> Self {
        PlotFitError::SerializationError(err.to_string())
    }
}
