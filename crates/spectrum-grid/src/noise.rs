//! Noise estimation for spectrum grids.

/// Median of the absolute intensities in a buffer.
///
/// Non-finite samples are ignored. Returns 0.0 for an empty (or all
/// non-finite) buffer. For an even count the two middle values are
/// averaged.
pub fn median_absolute(data: &[f64]) -> f64 {
    let mut magnitudes: Vec<f64> = data
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| v.abs())
        .collect();
    if magnitudes.is_empty() {
        return 0.0;
    }
    magnitudes.sort_unstable_by(f64::total_cmp);

    let mid = magnitudes.len() / 2;
    if magnitudes.len() % 2 == 1 {
        magnitudes[mid]
    } else {
        (magnitudes[mid - 1] + magnitudes[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median_absolute(&[3.0, -1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median_absolute(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_median_uses_magnitudes() {
        assert_eq!(median_absolute(&[-5.0, -5.0, 1.0]), 5.0);
    }

    #[test]
    fn test_median_ignores_non_finite() {
        assert_eq!(median_absolute(&[f64::NAN, 2.0, f64::INFINITY]), 2.0);
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median_absolute(&[]), 0.0);
    }
}
