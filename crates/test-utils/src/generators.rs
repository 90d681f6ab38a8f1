//! Synthetic spectrum grids for tests.
//!
//! These generators create predictable, verifiable intensity matrices in
//! the row-of-buffers shape the grid constructors accept.

/// Creates a ramp grid with predictable values.
///
/// Each cell value is calculated as: `offset + col + row`
///
/// This makes it easy to verify reduction output by hand: the maximum of
/// any rectangular block sits at its bottom-right corner and the minimum
/// at its top-left corner.
///
/// # Arguments
///
/// * `cols` - Number of columns per row
/// * `rows` - Number of rows
/// * `offset` - Base value added to every cell
///
/// # Example
///
/// ```
/// use test_utils::ramp_rows;
///
/// let z = ramp_rows(11, 11, 1000.0);
/// assert_eq!(z.len(), 11);
/// assert_eq!(z[0][0], 1000.0);  // offset + 0 + 0
/// assert_eq!(z[10][10], 1020.0); // offset + 10 + 10
/// ```
pub fn ramp_rows(cols: usize, rows: usize, offset: f64) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|row| (0..cols).map(|col| offset + (col + row) as f64).collect())
        .collect()
}

/// Creates a grid with a single Gaussian peak at the center.
///
/// Values range from near zero at the edges up to `amplitude` at the
/// center, falling off with the given width (in grid points).
pub fn peak_rows(cols: usize, rows: usize, amplitude: f64, width: f64) -> Vec<Vec<f64>> {
    let cx = (cols as f64 - 1.0) / 2.0;
    let cy = (rows as f64 - 1.0) / 2.0;
    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let dx = col as f64 - cx;
                    let dy = row as f64 - cy;
                    amplitude * (-(dx * dx + dy * dy) / (2.0 * width * width)).exp()
                })
                .collect()
        })
        .collect()
}

/// Creates a grid with a positive peak in one quadrant and a negative
/// peak of the same magnitude in the opposite quadrant.
///
/// Useful for exercising independent positive and negative contour
/// envelopes.
pub fn bipolar_rows(cols: usize, rows: usize, amplitude: f64, width: f64) -> Vec<Vec<f64>> {
    let px = (cols as f64 - 1.0) * 0.25;
    let py = (rows as f64 - 1.0) * 0.25;
    let nx = (cols as f64 - 1.0) * 0.75;
    let ny = (rows as f64 - 1.0) * 0.75;
    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let x = col as f64;
                    let y = row as f64;
                    let dp = (x - px) * (x - px) + (y - py) * (y - py);
                    let dn = (x - nx) * (x - nx) + (y - ny) * (y - ny);
                    let s = 2.0 * width * width;
                    amplitude * ((-dp / s).exp() - (-dn / s).exp())
                })
                .collect()
        })
        .collect()
}

/// Creates a flat grid where every cell holds `value`.
pub fn flat_rows(cols: usize, rows: usize, value: f64) -> Vec<Vec<f64>> {
    vec![vec![value; cols]; rows]
}
