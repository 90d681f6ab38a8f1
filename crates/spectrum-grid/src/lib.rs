//! 2D Spectrum Grid Model and Peak-Preserving Decimation
//!
//! This crate holds the data model for 2D spectrum intensity grids and
//! the reduction step that makes interactive contour rendering possible:
//!
//! - **Grid**: immutable intensity matrix plus domain bounds and a noise
//!   estimate, built once per loaded spectrum
//! - **Reduction**: clip the visible window and decimate it to a bounded
//!   resolution, keeping locally-dominant extrema so peaks survive
//!
//! # Architecture
//!
//! ```text
//! Spectrum load / pan / zoom
//!      │
//!      ▼
//! reduce(grid, window)
//!      │
//!      ├─► both axes already fit: return the same grid (Arc::ptr_eq)
//!      │
//!      └─► clip to the window's index range
//!               │
//!               ├─► quantize each axis into min(target, source) bins
//!               │
//!               └─► per bin: keep max when the sum is non-negative,
//!                   min otherwise
//!                        │
//!                        ▼
//!                   new Grid (same spectrum id, same noise)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spectrum_grid::{reduce, DomainBounds, Grid, ReductionWindow};
//!
//! let bounds = DomainBounds::new(0.0, 10.0, 0.0, 10.0);
//! let rows = (0..=10)
//!     .map(|r| (0..=10).map(|c| (r + c) as f64).collect())
//!     .collect();
//! let grid = Arc::new(Grid::from_matrix(bounds, rows).unwrap());
//!
//! let window = ReductionWindow::full_domain(&grid, 4).unwrap();
//! let reduced = reduce(&grid, &window).unwrap();
//! assert_eq!(reduced.rows(), 4);
//! assert_eq!(reduced.cols(), 4);
//! ```

pub mod decimate;
pub mod error;
pub mod noise;
mod resample;
pub mod types;

// Re-export commonly used types at crate root
pub use decimate::{reduce, reduce_with, ReductionMethod};
pub use error::{GridError, Result};
pub use noise::median_absolute;
pub use types::{DomainBounds, Grid, ReductionWindow, SpectrumId, DEFAULT_TARGET_POINTS};
