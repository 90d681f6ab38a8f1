//! Isoline extraction using the marching squares algorithm.
//!
//! Runs over every threshold of a ladder and flattens the resulting
//! segments into one [`ContourSet`] per sign. Tracing is best-effort: a
//! wall-clock budget and a segment ceiling bound the cost, and hitting
//! either returns whatever was produced so far instead of failing.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use spectrum_grid::Grid;
use tracing::{debug, warn};

use crate::error::{ContourError, Result};
use crate::levels::{Sign, ThresholdLadder};

/// Default wall-clock budget for one trace call.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
/// Default ceiling on the number of traced segments.
pub const DEFAULT_MAX_SEGMENTS: usize = 1_000_000;

/// A point in 2D space (domain coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// All segments traced for one envelope sign, flattened across the
/// ladder's thresholds. Rebuilt whole on every trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    pub sign: Sign,
    pub segments: Vec<Segment>,
}

impl ContourSet {
    /// An empty set for the given sign.
    pub fn empty(sign: Sign) -> Self {
        Self {
            sign,
            segments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Budget configuration for one trace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    /// Wall-clock budget in milliseconds.
    pub timeout_ms: u64,
    /// Ceiling on the number of traced segments.
    pub max_segments: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_segments: DEFAULT_MAX_SEGMENTS,
        }
    }
}

impl TraceOptions {
    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Why a trace stopped before covering the whole ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialReason {
    /// The wall-clock budget ran out.
    TimedOut,
    /// The segment ceiling was reached.
    SegmentCapReached,
}

/// Result of a trace call.
///
/// Budget exhaustion is not an error: `Partial` still carries every
/// segment produced before the budget ran out.
#[derive(Debug, Clone)]
pub enum TraceOutcome {
    /// Every threshold was traced to completion.
    Complete(ContourSet),
    /// Tracing stopped early; the set holds what was produced so far.
    Partial {
        contours: ContourSet,
        reason: PartialReason,
    },
}

impl TraceOutcome {
    /// The traced segments, complete or not.
    pub fn contours(&self) -> &ContourSet {
        match self {
            Self::Complete(set) => set,
            Self::Partial { contours, .. } => contours,
        }
    }

    /// Consume the outcome, keeping the segments.
    pub fn into_contours(self) -> ContourSet {
        match self {
            Self::Complete(set) => set,
            Self::Partial { contours, .. } => contours,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Whether the wall-clock budget ran out.
    pub fn timed_out(&self) -> bool {
        matches!(
            self,
            Self::Partial {
                reason: PartialReason::TimedOut,
                ..
            }
        )
    }

    /// Whether the segment ceiling was reached.
    pub fn hit_segment_cap(&self) -> bool {
        matches!(
            self,
            Self::Partial {
                reason: PartialReason::SegmentCapReached,
                ..
            }
        )
    }
}

/// Trace isolines for every threshold in the ladder.
///
/// Deterministic: thresholds in ladder order, cells in row-major order,
/// fixed emission order per cell. Cells containing non-finite samples
/// are skipped; non-finite thresholds are skipped whole. Fails only when
/// the ladder was built for a different spectrum.
pub fn trace(grid: &Grid, ladder: &ThresholdLadder, options: &TraceOptions) -> Result<TraceOutcome> {
    if ladder.spectrum_id() != grid.spectrum_id() {
        return Err(ContourError::SpectrumMismatch {
            state: ladder.spectrum_id(),
            grid: grid.spectrum_id(),
        });
    }

    let start = Instant::now();
    let timeout = options.timeout();
    let rows = grid.rows();
    let cols = grid.cols();
    let mut segments: Vec<Segment> = Vec::new();
    let mut stopped: Option<PartialReason> = None;

    if rows >= 2 && cols >= 2 {
        'ladder: for &level in ladder.levels() {
            if !level.is_finite() {
                warn!(level, "skipping non-finite contour level");
                continue;
            }
            for row in 0..rows - 1 {
                // One budget check per row keeps the overhead off the
                // inner cell loop
                if start.elapsed() >= timeout {
                    stopped = Some(PartialReason::TimedOut);
                    break 'ladder;
                }
                for col in 0..cols - 1 {
                    march_cell(grid, row, col, level, &mut segments);
                    if segments.len() >= options.max_segments {
                        segments.truncate(options.max_segments);
                        stopped = Some(PartialReason::SegmentCapReached);
                        break 'ladder;
                    }
                }
            }
        }
    }

    debug!(
        rows,
        cols,
        nb_levels = ladder.levels().len(),
        nb_segments = segments.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        ?stopped,
        "traced contours"
    );

    let contours = ContourSet {
        sign: ladder.sign(),
        segments,
    };
    Ok(match stopped {
        None => TraceOutcome::Complete(contours),
        Some(reason) => TraceOutcome::Partial { contours, reason },
    })
}

/// Extract the contour segments crossing one grid cell.
///
/// Corners are indexed top-left, top-right, bottom-right, bottom-left;
/// the 16-case lookup connects the edges the level crosses, with linear
/// interpolation along each crossed edge.
fn march_cell(grid: &Grid, row: usize, col: usize, level: f64, out: &mut Vec<Segment>) {
    let tl = grid.value(row, col);
    let tr = grid.value(row, col + 1);
    let bl = grid.value(row + 1, col);
    let br = grid.value(row + 1, col + 1);

    if !tl.is_finite() || !tr.is_finite() || !bl.is_finite() || !br.is_finite() {
        return;
    }

    let mut cell_index = 0u8;
    if tl >= level {
        cell_index |= 1;
    }
    if tr >= level {
        cell_index |= 2;
    }
    if br >= level {
        cell_index |= 4;
    }
    if bl >= level {
        cell_index |= 8;
    }
    if cell_index == 0 || cell_index == 15 {
        return;
    }

    let x = col as f64;
    let y = row as f64;
    let top = interpolate_edge(grid, x, y, x + 1.0, y, tl, tr, level);
    let right = interpolate_edge(grid, x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = interpolate_edge(grid, x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = interpolate_edge(grid, x, y, x, y + 1.0, tl, bl, level);

    match cell_index {
        1 | 14 => out.push(Segment {
            start: left,
            end: top,
        }),
        2 | 13 => out.push(Segment {
            start: top,
            end: right,
        }),
        3 | 12 => out.push(Segment {
            start: left,
            end: right,
        }),
        4 | 11 => out.push(Segment {
            start: right,
            end: bottom,
        }),
        5 => {
            // Saddle: two separate segments
            out.push(Segment {
                start: left,
                end: top,
            });
            out.push(Segment {
                start: right,
                end: bottom,
            });
        }
        6 | 9 => out.push(Segment {
            start: top,
            end: bottom,
        }),
        7 | 8 => out.push(Segment {
            start: left,
            end: bottom,
        }),
        10 => {
            // Saddle: two separate segments
            out.push(Segment {
                start: top,
                end: right,
            });
            out.push(Segment {
                start: left,
                end: bottom,
            });
        }
        _ => {}
    }
}

/// Find where the level crosses an edge, in domain coordinates.
///
/// Edge endpoints are given in index space and mapped through the grid's
/// affine axis scales after interpolating.
fn interpolate_edge(
    grid: &Grid,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    val1: f64,
    val2: f64,
    level: f64,
) -> Point {
    let (ix, iy) = if val2 == val1 {
        // Flat edge: use the midpoint
        ((x1 + x2) / 2.0, (y1 + y2) / 2.0)
    } else {
        let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
        (x1 + t * (x2 - x1), y1 + t * (y2 - y1))
    };
    Point::new(grid.x_coord(ix), grid.y_coord(iy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelState, Sign};
    use spectrum_grid::DomainBounds;

    fn grid_from(rows: Vec<Vec<f64>>) -> Grid {
        let cols = rows[0].len();
        let height = rows.len();
        let bounds = DomainBounds::new(0.0, (cols - 1) as f64, 0.0, (height - 1) as f64);
        Grid::from_rows(bounds, rows, 1.0).unwrap()
    }

    fn ladder_for(grid: &Grid, levels: Vec<f64>) -> ThresholdLadder {
        ThresholdLadder::new(Sign::Positive, grid.spectrum_id(), levels).unwrap()
    }

    #[test]
    fn test_options_serde_defaults() {
        let opts: TraceOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, TraceOptions::default());

        let opts: TraceOptions = serde_json::from_str("{\"timeout_ms\": 250}").unwrap();
        assert_eq!(opts.timeout_ms, 250);
        assert_eq!(opts.max_segments, DEFAULT_MAX_SEGMENTS);
    }

    #[test]
    fn test_flat_field_no_contours() {
        let grid = grid_from(vec![vec![5.0; 3]; 3]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![5.0]), &TraceOptions::default()).unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.contours().is_empty());
    }

    #[test]
    fn test_single_corner_above() {
        let grid = grid_from(vec![vec![10.0, 0.0], vec![0.0, 0.0]]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![5.0]), &TraceOptions::default()).unwrap();

        let set = outcome.contours();
        assert_eq!(set.len(), 1);
        // Crossing sits halfway along the left and top edges
        let seg = set.segments[0];
        assert!(seg.start.x < 0.51 && seg.end.y < 0.51);
    }

    #[test]
    fn test_horizontal_gradient_vertical_line() {
        let grid = grid_from(vec![vec![0.0, 100.0], vec![0.0, 100.0]]);
        let outcome =
            trace(&grid, &ladder_for(&grid, vec![50.0]), &TraceOptions::default()).unwrap();

        let set = outcome.contours();
        assert_eq!(set.len(), 1);
        let seg = set.segments[0];
        assert_eq!(seg.start.x, seg.end.x);
        assert!((seg.start.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_saddle_cases_emit_two_segments() {
        let grid = grid_from(vec![vec![10.0, 0.0], vec![0.0, 10.0]]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![5.0]), &TraceOptions::default()).unwrap();
        assert_eq!(outcome.contours().len(), 2);

        let grid = grid_from(vec![vec![0.0, 10.0], vec![10.0, 0.0]]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![5.0]), &TraceOptions::default()).unwrap();
        assert_eq!(outcome.contours().len(), 2);
    }

    #[test]
    fn test_non_finite_cells_skipped() {
        let grid = grid_from(vec![
            vec![f64::NAN, 10.0, 10.0],
            vec![0.0, 10.0, 10.0],
            vec![0.0, 0.0, 0.0],
        ]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![5.0]), &TraceOptions::default()).unwrap();
        assert!(!outcome.contours().is_empty());
    }

    #[test]
    fn test_non_finite_level_skipped() {
        let grid = grid_from(vec![vec![0.0, 10.0], vec![0.0, 10.0]]);
        let ladder = ladder_for(&grid, vec![f64::NAN, 5.0]);
        let outcome = trace(&grid, &ladder, &TraceOptions::default()).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.contours().len(), 1);
    }

    #[test]
    fn test_degenerate_grid_empty_complete() {
        let grid = grid_from(vec![vec![1.0]]);
        let outcome = trace(&grid, &ladder_for(&grid, vec![0.5]), &TraceOptions::default()).unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.contours().is_empty());
    }

    #[test]
    fn test_segments_in_domain_coordinates() {
        let bounds = DomainBounds::new(100.0, 200.0, 50.0, 150.0);
        let grid = Grid::from_rows(
            bounds,
            vec![vec![0.0, 100.0], vec![0.0, 100.0]],
            1.0,
        )
        .unwrap();
        let ladder = ThresholdLadder::new(Sign::Positive, grid.spectrum_id(), vec![50.0]).unwrap();
        let outcome = trace(&grid, &ladder, &TraceOptions::default()).unwrap();

        let seg = outcome.contours().segments[0];
        assert!((seg.start.x - 150.0).abs() < 1e-9);
        assert!(seg.start.y >= 50.0 && seg.end.y <= 150.0);
    }

    #[test]
    fn test_mismatched_ladder_rejected() {
        let a = grid_from(vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
        let b = grid_from(vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
        let ladder = ladder_for(&a, vec![0.5]);
        assert!(matches!(
            trace(&b, &ladder, &TraceOptions::default()),
            Err(ContourError::SpectrumMismatch { .. })
        ));
    }

    #[test]
    fn test_levels_state_threshold_roundtrip() {
        let grid = grid_from(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1000.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ]);
        let state = LevelState::initiate(&grid);
        let ladder = crate::levels::build_thresholds(&state, &grid, Sign::Positive).unwrap();
        let outcome = trace(&grid, &ladder, &TraceOptions::default()).unwrap();

        // Some thresholds exceed the peak and produce nothing; the ones
        // below it surround the center
        assert!(outcome.is_complete());
        assert!(!outcome.contours().is_empty());
    }
}
