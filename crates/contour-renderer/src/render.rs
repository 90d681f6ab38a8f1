//! High-level entry point wiring reduction, thresholds, tracing and path
//! emission together.
//!
//! This is what the view layer calls on a spectrum load or pan/zoom. A
//! wheel adjustment only needs new thresholds and a re-trace, so callers
//! keep the reduced grid and call the lower-level functions directly in
//! that case.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spectrum_grid::{reduce_with, Grid, ReductionMethod, ReductionWindow};
use tracing::debug;

use crate::error::Result;
use crate::levels::{build_thresholds_with, LevelState, Sign, DEFAULT_NB_LEVELS};
use crate::path::{to_svg_path, PathOutput, DEFAULT_SEGMENT_CAP};
use crate::trace::{trace, TraceOptions};

/// Options for a full render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Thresholds per envelope sign.
    pub nb_levels: usize,
    /// Reduction method for the visible window.
    pub method: ReductionMethod,
    /// Tracer budget.
    pub trace: TraceOptions,
    /// Ceiling on emitted segments per sign.
    pub segment_cap: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            nb_levels: DEFAULT_NB_LEVELS,
            method: ReductionMethod::default(),
            trace: TraceOptions::default(),
            segment_cap: DEFAULT_SEGMENT_CAP,
        }
    }
}

/// Both envelopes rendered to screen-space paths, plus the degradation
/// flags for the caller's one debounced notice.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub positive: PathOutput,
    pub negative: PathOutput,
    /// A trace ran out of wall-clock budget; the paths show a partial
    /// (possibly sparser) plot.
    pub timed_out: bool,
    /// Segments were dropped by the tracer ceiling or the emitter cap.
    pub truncated: bool,
}

/// Reduce the visible window and render both contour envelopes.
pub fn render<FX, FY>(
    grid: &Arc<Grid>,
    window: &ReductionWindow,
    state: &LevelState,
    scale_x: FX,
    scale_y: FY,
    options: &RenderOptions,
) -> Result<RenderOutput>
where
    FX: Fn(f64) -> f64,
    FY: Fn(f64) -> f64,
{
    let reduced = reduce_with(grid, window, options.method)?;

    let mut timed_out = false;
    let mut cap_hit = false;
    let mut emit = |sign: Sign| -> Result<PathOutput> {
        let ladder = build_thresholds_with(state, &reduced, sign, options.nb_levels)?;
        let outcome = trace(&reduced, &ladder, &options.trace)?;
        timed_out |= outcome.timed_out();
        cap_hit |= outcome.hit_segment_cap();
        Ok(to_svg_path(
            outcome.contours(),
            &scale_x,
            &scale_y,
            options.segment_cap,
        ))
    };

    let positive = emit(Sign::Positive)?;
    let negative = emit(Sign::Negative)?;

    let truncated = cap_hit || positive.truncated || negative.truncated;
    debug!(
        positive_segments = positive.emitted,
        negative_segments = negative.emitted,
        timed_out,
        truncated,
        "rendered contour paths"
    );

    Ok(RenderOutput {
        positive,
        negative,
        timed_out,
        truncated,
    })
}
