//! Screen-space path emission for traced contour sets.
//!
//! Converts domain-space segments into drawable primitives through the
//! caller's axis scale functions. A hard segment cap bounds rendering
//! cost; when it is hit, the emitted path is truncated and a flag tells
//! the caller to surface a single debounced notice.

use std::fmt::Write;

use crate::trace::ContourSet;

/// Default ceiling on emitted segments.
pub const DEFAULT_SEGMENT_CAP: usize = 1_000_000;

/// A drawable path primitive in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
}

/// An emitted path plus what happened while emitting it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutput {
    /// SVG path data (`M x y L x y` per segment).
    pub path: String,
    /// Number of segments emitted.
    pub emitted: usize,
    /// Whether the segment cap truncated the set.
    pub truncated: bool,
}

/// Emit a contour set as move/line primitives in screen space.
///
/// At most `segment_cap` segments are emitted; the returned flag
/// reports whether anything was dropped.
pub fn to_path_ops<FX, FY>(
    set: &ContourSet,
    scale_x: FX,
    scale_y: FY,
    segment_cap: usize,
) -> (Vec<PathOp>, bool)
where
    FX: Fn(f64) -> f64,
    FY: Fn(f64) -> f64,
{
    let take = set.segments.len().min(segment_cap);
    let truncated = set.segments.len() > segment_cap;

    let mut ops = Vec::with_capacity(take * 2);
    for seg in &set.segments[..take] {
        ops.push(PathOp::MoveTo {
            x: scale_x(seg.start.x),
            y: scale_y(seg.start.y),
        });
        ops.push(PathOp::LineTo {
            x: scale_x(seg.end.x),
            y: scale_y(seg.end.y),
        });
    }
    (ops, truncated)
}

/// Emit a contour set as an SVG path-data string in screen space.
pub fn to_svg_path<FX, FY>(
    set: &ContourSet,
    scale_x: FX,
    scale_y: FY,
    segment_cap: usize,
) -> PathOutput
where
    FX: Fn(f64) -> f64,
    FY: Fn(f64) -> f64,
{
    let take = set.segments.len().min(segment_cap);
    let truncated = set.segments.len() > segment_cap;

    let mut path = String::with_capacity(take * 32);
    for seg in &set.segments[..take] {
        let _ = write!(
            path,
            "M{} {}L{} {}",
            scale_x(seg.start.x),
            scale_y(seg.start.y),
            scale_x(seg.end.x),
            scale_y(seg.end.y)
        );
    }

    PathOutput {
        path,
        emitted: take,
        truncated,
    }
}
