//! Order statistics and shape checks shared by the analyzers

use crate::albedo_pipeline::common::error::{AlbedoError, Result};

/// Median of `values`, reordering the slice in the process.
///
/// Even-length inputs return the mean of the two middle order statistics.
/// Returns `None` for an empty slice.
pub fn median_in_place(values: &mut [f32]) -> Option<f32> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *upper;

    if n % 2 == 1 {
        return Some(upper);
    }

    let below = lower.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    Some(0.5 * (below + upper))
}

/// `percentile` (0-100) of `values` with linear interpolation between the
/// neighbouring order statistics. Reorders the slice.
pub fn percentile_in_place(values: &mut [f32], percentile: f32) -> Option<f32> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let rank = (percentile.clamp(0.0, 100.0) as f64 / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = (rank - lo as f64) as f32;

    let (_, lo_value, above) = values.select_nth_unstable_by(lo, f32::total_cmp);
    let lo_value = *lo_value;

    if frac == 0.0 || above.is_empty() {
        return Some(lo_value);
    }

    // Next order statistic is the smallest value right of the pivot
    let hi_value = above.iter().copied().fold(f32::INFINITY, f32::min);
    Some(lo_value + (hi_value - lo_value) * frac)
}

pub fn check_same_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        return Err(AlbedoError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        let mut odd = vec![5.0, 1.0, 3.0];
        assert_eq!(median_in_place(&mut odd), Some(3.0));

        let mut even = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median_in_place(&mut even), Some(2.5));

        assert_eq!(median_in_place(&mut []), None);
    }

    #[test]
    fn test_percentile_interpolates() {
        let mut values: Vec<f32> = (0..=10).map(|v| v as f32).collect();
        assert_eq!(percentile_in_place(&mut values, 90.0), Some(9.0));

        let mut values = vec![0.0, 1.0];
        let p = percentile_in_place(&mut values, 90.0).unwrap();
        assert!((p - 0.9).abs() < 1e-6);

        let mut single = vec![7.0];
        assert_eq!(percentile_in_place(&mut single, 90.0), Some(7.0));
    }

    #[test]
    fn test_dimension_check() {
        assert!(check_same_dimensions((4, 3), (4, 3)).is_ok());
        assert!(matches!(
            check_same_dimensions((4, 3), (3, 4)),
            Err(AlbedoError::DimensionMismatch { .. })
        ));
    }
}
