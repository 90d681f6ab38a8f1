//! Core types for the 2D spectrum grid model.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::noise::median_absolute;

static NEXT_SPECTRUM_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying a loaded spectrum.
///
/// Every grid built from a spectrum matrix gets a fresh id; reduced views
/// of that grid inherit it. Level state and threshold ladders are bound to
/// the id they were computed from, so using them against a different
/// spectrum is a typed error instead of a silent stale read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpectrumId(u64);

impl SpectrumId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SPECTRUM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The x/y domain covered by a grid, in spectrum units (e.g. ppm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DomainBounds {
    /// Create a new domain bounds value.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Get the width in domain units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height in domain units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn validate(&self) -> Result<()> {
        let finite = self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite();
        if !finite {
            return Err(GridError::invalid_bounds(format!("{self:?}")));
        }
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(GridError::invalid_bounds(format!(
                "min must be below max: {self:?}"
            )));
        }
        Ok(())
    }
}

/// A 2D intensity matrix with its domain bounds and noise estimate.
///
/// Immutable once built: every transform (reduction, resampling) yields a
/// new grid. The buffer is stored row-major; `value(row, col)` addresses
/// it, with row 0 at `min_y` and column 0 at `min_x`.
#[derive(Debug, Clone)]
pub struct Grid {
    spectrum_id: SpectrumId,
    bounds: DomainBounds,
    min_z: f64,
    max_z: f64,
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    noise: f64,
}

impl Grid {
    /// Build a grid from per-row intensity buffers and a loader-supplied
    /// noise estimate. Intensity bounds are scanned from the data.
    ///
    /// Fails fast on empty or ragged rows, inverted bounds, and a
    /// non-finite noise value.
    pub fn from_rows(bounds: DomainBounds, z: Vec<Vec<f64>>, noise: f64) -> Result<Self> {
        Self::build(bounds, z, Some(noise))
    }

    /// Build a grid from per-row intensity buffers, deriving the noise
    /// estimate as the median of absolute intensities.
    ///
    /// This is the spectrum-load path: the raw real-part matrix comes in,
    /// statistics come out.
    pub fn from_matrix(bounds: DomainBounds, z: Vec<Vec<f64>>) -> Result<Self> {
        Self::build(bounds, z, None)
    }

    fn build(bounds: DomainBounds, z: Vec<Vec<f64>>, noise: Option<f64>) -> Result<Self> {
        bounds.validate()?;

        let rows = z.len();
        if rows == 0 {
            return Err(GridError::EmptyGrid);
        }
        let cols = z[0].len();
        if cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        for (row, buf) in z.iter().enumerate() {
            if buf.len() != cols {
                return Err(GridError::RaggedRows {
                    row,
                    expected: cols,
                    actual: buf.len(),
                });
            }
        }

        let mut data = Vec::with_capacity(rows * cols);
        for buf in &z {
            data.extend_from_slice(buf);
        }

        let noise = match noise {
            Some(n) if !n.is_finite() => return Err(GridError::NonFiniteNoise(n)),
            Some(n) => n,
            None => median_absolute(&data),
        };

        let (min_z, max_z) = z_bounds(&data);

        Ok(Self {
            spectrum_id: SpectrumId::next(),
            bounds,
            min_z,
            max_z,
            data,
            rows,
            cols,
            noise,
        })
    }

    /// Internal constructor for derived grids (reductions keep the source
    /// spectrum id and noise estimate).
    pub(crate) fn derived(
        spectrum_id: SpectrumId,
        bounds: DomainBounds,
        data: Vec<f64>,
        rows: usize,
        cols: usize,
        noise: f64,
    ) -> Self {
        let (min_z, max_z) = z_bounds(&data);
        Self {
            spectrum_id,
            bounds,
            min_z,
            max_z,
            data,
            rows,
            cols,
            noise,
        }
    }

    /// The spectrum this grid belongs to.
    pub fn spectrum_id(&self) -> SpectrumId {
        self.spectrum_id
    }

    /// The x/y domain covered by this grid.
    pub fn bounds(&self) -> DomainBounds {
        self.bounds
    }

    /// Smallest intensity in the grid.
    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    /// Largest intensity in the grid.
    pub fn max_z(&self) -> f64 {
        self.max_z
    }

    /// Largest absolute intensity, `max(|min_z|, |max_z|)`.
    pub fn max_abs_z(&self) -> f64 {
        self.min_z.abs().max(self.max_z.abs())
    }

    /// The noise estimate the grid was built with.
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Number of rows (y axis points).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (x axis points).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The full row-major buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get the intensity at a grid coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// One row of intensities.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Domain x coordinate of a (possibly fractional) column index.
    pub fn x_coord(&self, col: f64) -> f64 {
        self.bounds.min_x + col * self.x_step()
    }

    /// Domain y coordinate of a (possibly fractional) row index.
    pub fn y_coord(&self, row: f64) -> f64 {
        self.bounds.min_y + row * self.y_step()
    }

    /// Domain distance between adjacent columns (0 for a single column).
    pub fn x_step(&self) -> f64 {
        if self.cols < 2 {
            0.0
        } else {
            self.bounds.width() / (self.cols - 1) as f64
        }
    }

    /// Domain distance between adjacent rows (0 for a single row).
    pub fn y_step(&self) -> f64 {
        if self.rows < 2 {
            0.0
        } else {
            self.bounds.height() / (self.rows - 1) as f64
        }
    }
}

fn z_bounds(data: &[f64]) -> (f64, f64) {
    let mut min_z = f64::INFINITY;
    let mut max_z = f64::NEG_INFINITY;
    for &v in data {
        if v.is_finite() {
            min_z = min_z.min(v);
            max_z = max_z.max(v);
        }
    }
    (min_z, max_z)
}

/// Default target resolution per axis for interactive reduction.
pub const DEFAULT_TARGET_POINTS: usize = 256;

/// The visible domain plus a target resolution per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionWindow {
    pub from_x: f64,
    pub to_x: f64,
    pub from_y: f64,
    pub to_y: f64,
    pub target_points: usize,
}

impl ReductionWindow {
    /// Create a validated reduction window.
    pub fn new(
        from_x: f64,
        to_x: f64,
        from_y: f64,
        to_y: f64,
        target_points: usize,
    ) -> Result<Self> {
        let window = Self {
            from_x,
            to_x,
            from_y,
            to_y,
            target_points,
        };
        window.validate()?;
        Ok(window)
    }

    /// Window covering the grid's own domain, used when no explicit
    /// viewport is supplied.
    pub fn full_domain(grid: &Grid, target_points: usize) -> Result<Self> {
        let b = grid.bounds();
        Self::new(b.min_x, b.max_x, b.min_y, b.max_y, target_points)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let finite = self.from_x.is_finite()
            && self.to_x.is_finite()
            && self.from_y.is_finite()
            && self.to_y.is_finite();
        if !finite {
            return Err(GridError::invalid_window(format!("{self:?}")));
        }
        if self.from_x > self.to_x || self.from_y > self.to_y {
            return Err(GridError::invalid_window(format!(
                "from must not exceed to: {self:?}"
            )));
        }
        if self.target_points == 0 {
            return Err(GridError::invalid_window(
                "target_points must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> DomainBounds {
        DomainBounds::new(0.0, 10.0, 0.0, 5.0)
    }

    #[test]
    fn test_from_rows_scans_z_bounds() {
        let grid = Grid::from_rows(bounds(), vec![vec![-3.0, 2.0], vec![7.0, 0.5]], 0.1).unwrap();
        assert_eq!(grid.min_z(), -3.0);
        assert_eq!(grid.max_z(), 7.0);
        assert_eq!(grid.max_abs_z(), 7.0);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);
    }

    #[test]
    fn test_from_matrix_derives_noise() {
        let grid = Grid::from_matrix(bounds(), vec![vec![-1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(grid.noise(), 2.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Grid::from_rows(bounds(), vec![vec![1.0, 2.0], vec![3.0]], 0.1).unwrap_err();
        assert!(matches!(
            err,
            GridError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            Grid::from_rows(bounds(), vec![], 0.1),
            Err(GridError::EmptyGrid)
        ));
        assert!(matches!(
            Grid::from_rows(bounds(), vec![vec![]], 0.1),
            Err(GridError::EmptyGrid)
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let bad = DomainBounds::new(10.0, 0.0, 0.0, 5.0);
        assert!(Grid::from_rows(bad, vec![vec![1.0]], 0.1).is_err());
    }

    #[test]
    fn test_non_finite_noise_rejected() {
        let err = Grid::from_rows(bounds(), vec![vec![1.0]], f64::NAN).unwrap_err();
        assert!(matches!(err, GridError::NonFiniteNoise(_)));
    }

    #[test]
    fn test_fresh_spectrum_ids() {
        let a = Grid::from_rows(bounds(), vec![vec![1.0]], 0.1).unwrap();
        let b = Grid::from_rows(bounds(), vec![vec![1.0]], 0.1).unwrap();
        assert_ne!(a.spectrum_id(), b.spectrum_id());
    }

    #[test]
    fn test_coord_mapping() {
        let grid =
            Grid::from_rows(bounds(), vec![vec![0.0; 11], vec![0.0; 11], vec![0.0; 11]], 0.1)
                .unwrap();
        assert_eq!(grid.x_coord(0.0), 0.0);
        assert_eq!(grid.x_coord(10.0), 10.0);
        assert_eq!(grid.x_coord(5.0), 5.0);
        assert_eq!(grid.y_coord(2.0), 5.0);
    }

    #[test]
    fn test_window_validation() {
        assert!(ReductionWindow::new(0.0, 1.0, 0.0, 1.0, 16).is_ok());
        assert!(ReductionWindow::new(1.0, 0.0, 0.0, 1.0, 16).is_err());
        assert!(ReductionWindow::new(0.0, 1.0, 0.0, 1.0, 0).is_err());
        assert!(ReductionWindow::new(f64::NAN, 1.0, 0.0, 1.0, 16).is_err());
    }

    #[test]
    fn test_window_full_domain() {
        let grid = Grid::from_rows(bounds(), vec![vec![0.0, 1.0]], 0.1).unwrap();
        let window = ReductionWindow::full_domain(&grid, 32).unwrap();
        assert_eq!(window.from_x, 0.0);
        assert_eq!(window.to_x, 10.0);
        assert_eq!(window.from_y, 0.0);
        assert_eq!(window.to_y, 5.0);
    }
}
