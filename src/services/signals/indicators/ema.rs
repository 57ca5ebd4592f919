//! Exponential Moving Average (EMA).

/// Smoothed series with factor alpha = 2 / (span + 1).
///
/// The recursion is seeded by the first observation with no bias
/// correction, so the output has one value per input value.
///
/// Returns `None` when fewer than `span` values are available.
pub fn ema_series(values: &[f64], span: usize) -> Option<Vec<f64>> {
    if span == 0 || values.len() < span {
        return None;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    out.push(current);

    for &value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(current);
    }

    Some(out)
}

/// Latest EMA value over the series.
pub fn ema(values: &[f64], span: usize) -> Option<f64> {
    ema_series(values, span).and_then(|s| s.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema(&[100.0, 101.0], 3).is_none());
        assert!(ema(&[], 1).is_none());
    }

    #[test]
    fn test_ema_seeded_by_first_observation() {
        // span 2 -> alpha = 2/3; ema = 2/3 * 20 + 1/3 * 10
        let series = ema_series(&[10.0, 20.0], 2).unwrap();
        assert_eq!(series[0], 10.0);
        assert!((series[1] - 50.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_series_length_matches_input() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = ema_series(&values, 10).unwrap();
        assert_eq!(series.len(), values.len());
    }

    #[test]
    fn test_ema_constant_series_is_constant() {
        let values = vec![250.0; 30];
        let series = ema_series(&values, 10).unwrap();
        for value in series {
            assert!((value - 250.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_lags_below_rising_prices() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let last = *values.last().unwrap();
        let value = ema(&values, 20).unwrap();
        assert!(value < last);
        assert!(value > values[0]);
    }
}
