//! Error types for the spectrum grid model.

use thiserror::Error;

/// Errors that can occur while building or reducing a grid.
///
/// All of these indicate malformed caller input; degradation conditions
/// (budget exhaustion during tracing) are reported by the contour layer,
/// not as errors here.
#[derive(Error, Debug)]
pub enum GridError {
    /// The intensity matrix has no rows or no columns.
    #[error("grid has no rows or empty rows")]
    EmptyGrid,

    /// A row's length differs from the first row's length.
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Domain bounds are inverted or not finite.
    #[error("invalid domain bounds: {0}")]
    InvalidBounds(String),

    /// The noise estimate is NaN or infinite.
    #[error("noise estimate is not finite: {0}")]
    NonFiniteNoise(f64),

    /// The reduction window is inverted or has no target resolution.
    #[error("invalid reduction window: {0}")]
    InvalidWindow(String),
}

impl GridError {
    /// Create an InvalidBounds error.
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidBounds(msg.into())
    }

    /// Create an InvalidWindow error.
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
