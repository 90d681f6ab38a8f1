//! Error types for contour rendering.

use spectrum_grid::{GridError, SpectrumId};
use thiserror::Error;

/// Errors that can occur while building thresholds or tracing contours.
///
/// Budget exhaustion (timeout, segment cap) is not an error: the tracer
/// reports it through [`crate::trace::TraceOutcome::Partial`].
#[derive(Error, Debug)]
pub enum ContourError {
    /// Level state or a threshold ladder was used against a grid from a
    /// different spectrum.
    #[error("state was computed for spectrum {state:?} but used with spectrum {grid:?}")]
    SpectrumMismatch { state: SpectrumId, grid: SpectrumId },

    /// A threshold ladder needs at least one level.
    #[error("threshold ladder needs at least one level")]
    EmptyLadder,

    /// Grid construction or reduction failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;
