//! Robust statistics over raster samples.
//!
//! Percentiles use linear interpolation over the sorted finite values, the
//! same convention as NumPy's `percentile`. Degenerate inputs (empty or
//! single-element selections) fall back to the obvious value instead of
//! failing; callers rely on that when a scene is fully masked.

/// Returns the `q`-th percentile (0..=100) of `values` using linear
/// interpolation between the two nearest ranks.
///
/// Non-finite values are skipped. Returns 0.0 for an empty selection.
pub(crate) fn percentile(values: &[f32], q: f32) -> f32 {
    let mut finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    percentile_sorted(&finite, q)
}

/// Percentile over an already sorted slice of finite values.
pub(crate) fn percentile_sorted(sorted: &[f32], q: f32) -> f32 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let q = q.clamp(0.0, 100.0);
    let rank = q as f64 / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = (rank - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Median of `values`; 0.0 for an empty slice.
pub(crate) fn median(values: &[f32]) -> f32 {
    percentile(values, 50.0)
}

/// Median absolute deviation around `center`.
pub(crate) fn mad(values: &[f32], center: f32) -> f32 {
    let deviations: Vec<f32> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - center).abs())
        .collect();
    median(&deviations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-6);
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-6);
        assert!((percentile(&values, 100.0) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn percentile_of_empty_selection_is_zero() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[f32::NAN], 50.0), 0.0);
    }

    #[test]
    fn mad_of_constant_values_is_zero() {
        let values = [0.3; 16];
        let m = median(&values);
        assert_eq!(mad(&values, m), 0.0);
    }

    #[test]
    fn median_matches_middle_element() {
        let values = [5.0, 1.0, 3.0];
        assert!((median(&values) - 3.0).abs() < 1e-6);
    }
}
