//! Small descriptive-statistics helpers over `f64` slices.
//!
//! Median and quantile use linear interpolation between order statistics,
//! so results line up with previously published county figures.

/// Arithmetic mean. `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with linear interpolation (average of the middle two for an
/// even count). `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q` in `[0, 1]` with linear interpolation between the two
/// nearest order statistics. `None` for an empty slice or `q` outside
/// the unit interval.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    #[allow(clippy::cast_precision_loss)]
    let rank = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let weight = rank - rank.floor();

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Minimum value. `None` for an empty slice.
#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Maximum value. `None` for an empty slice.
#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn mean_of_values() {
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < EPS);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn median_odd_count() {
        assert!((median(&[3.0, 1.0, 2.0]).unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn median_even_count_interpolates() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]).unwrap() - 2.5).abs() < EPS);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        // Linear interpolation: quantile(0.25) of [1, 2, 3, 4] is 1.75.
        assert!((quantile(&[1.0, 2.0, 3.0, 4.0], 0.25).unwrap() - 1.75).abs() < EPS);
        assert!((quantile(&[1.0, 2.0, 3.0, 4.0], 0.0).unwrap() - 1.0).abs() < EPS);
        assert!((quantile(&[1.0, 2.0, 3.0, 4.0], 1.0).unwrap() - 4.0).abs() < EPS);
    }

    #[test]
    fn quantile_rejects_out_of_range() {
        assert_eq!(quantile(&[1.0], 1.5), None);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn min_max() {
        assert_eq!(min(&[2.0, -1.0, 3.0]), Some(-1.0));
        assert_eq!(max(&[2.0, -1.0, 3.0]), Some(3.0));
        assert_eq!(min(&[]), None);
    }
}
