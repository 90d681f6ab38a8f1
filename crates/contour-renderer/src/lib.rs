//! Contour rendering engine for 2D spectra.
//!
//! Turns a (reduced) intensity grid into bounded sets of drawable
//! isolines:
//! - Contour level state and threshold ladders ([`levels`])
//! - Marching-squares isoline tracing with a wall-clock budget ([`trace`])
//! - Screen-space path emission with a segment cap ([`path`])
//! - A high-level render pass wiring it all together ([`render`])

pub mod error;
pub mod levels;
pub mod path;
pub mod render;
pub mod trace;

// Re-export commonly used types at crate root
pub use error::{ContourError, Result};
pub use levels::{
    build_thresholds, build_thresholds_with, LevelState, Sign, ThresholdLadder, WheelInput,
    DEFAULT_LEVEL, DEFAULT_NB_LEVELS, LEVEL_MAX, LEVEL_MIN,
};
pub use path::{to_path_ops, to_svg_path, PathOp, PathOutput, DEFAULT_SEGMENT_CAP};
pub use render::{render, RenderOptions, RenderOutput};
pub use trace::{
    trace, ContourSet, PartialReason, Point, Segment, TraceOptions, TraceOutcome,
    DEFAULT_MAX_SEGMENTS, DEFAULT_TIMEOUT_MS,
};
