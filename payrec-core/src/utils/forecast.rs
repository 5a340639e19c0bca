//! Least-squares extrapolation over a uniformly sampled series.

/// Predict the next sample of a series via a least-squares linear fit.
///
/// Assumes a uniform sampling step (taken from the first two points).
/// With fewer than two samples, or mismatched lengths, falls back to the
/// last observed value (or zero when empty).
pub fn predict_next(times: &[f64], values: &[f64]) -> f64 {
    if times.len() < 2 || times.len() != values.len() {
        return values.last().copied().unwrap_or(0.0);
    }

    let n = times.len() as f64;
    let mean_x = times.iter().sum::<f64>() / n;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in times.iter().zip(values) {
        num += (x - mean_x) * (y - mean_y);
        den += (x - mean_x) * (x - mean_x);
    }

    let slope = if den == 0.0 { 0.0 } else { num / den };
    let intercept = mean_y - slope * mean_x;

    let step = times[1] - times[0];
    let last_x = times.iter().copied().fold(f64::MIN, f64::max);
    slope * (last_x + step) + intercept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_series_extrapolates() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let values = [100.0, 90.0, 80.0, 70.0];
        let predicted = predict_next(&times, &values);
        assert!((predicted - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_stays_flat() {
        let times = [0.0, 1.0, 2.0];
        let values = [50.0, 50.0, 50.0];
        assert!((predict_next(&times, &values) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs_fall_back_to_last_value() {
        assert_eq!(predict_next(&[], &[]), 0.0);
        assert_eq!(predict_next(&[1.0], &[42.0]), 42.0);
        // Zero time variance: slope is treated as flat.
        let predicted = predict_next(&[2.0, 2.0], &[10.0, 20.0]);
        assert!((predicted - 15.0).abs() < 1e-9);
    }
}
