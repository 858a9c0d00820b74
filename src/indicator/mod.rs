pub mod rsi;

const EPSILON: f64 = 1e-12;

/// Percentage change over `lag` observations ending at `i`.
/// Undefined when there is no observation `lag` back or the base is zero.
pub fn pct_change_at(values: &[f64], i: usize, lag: usize) -> Option<f64> {
    if lag == 0 || i < lag || i >= values.len() {
        return None;
    }
    let base = values[i - lag];
    if base.abs() <= EPSILON {
        return None;
    }
    Some((values[i] - base) / base)
}

/// Mean of a slice. Returns 0.0 on an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator) of the defined values in the
/// trailing window of length `window` ending at `end`, clipped at the series
/// start. Fewer than two defined values yield 0.0.
pub fn rolling_std_at(values: &[Option<f64>], end: usize, window: usize) -> f64 {
    if window == 0 || end >= values.len() {
        return 0.0;
    }
    let start = (end + 1).saturating_sub(window);
    let defined: Vec<f64> = values[start..=end].iter().filter_map(|v| *v).collect();
    if defined.len() < 2 {
        return 0.0;
    }
    let m = mean(&defined);
    let sum_sq: f64 = defined.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (defined.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_basic() {
        let prices = [100.0, 110.0, 121.0];
        let r = pct_change_at(&prices, 1, 1).unwrap();
        assert!((r - 0.10).abs() < 1e-12);
        let r2 = pct_change_at(&prices, 2, 2).unwrap();
        assert!((r2 - 0.21).abs() < 1e-12);
    }

    #[test]
    fn pct_change_undefined_cases() {
        let prices = [0.0, 100.0, 110.0];
        assert_eq!(pct_change_at(&prices, 0, 1), None);
        assert_eq!(pct_change_at(&prices, 1, 1), None); // zero base
        assert_eq!(pct_change_at(&prices, 2, 5), None); // not enough history
        assert_eq!(pct_change_at(&prices, 5, 1), None); // out of range
    }

    #[test]
    fn pct_change_zero_on_constant_series() {
        let prices = [50.0; 30];
        for i in 1..prices.len() {
            assert_eq!(pct_change_at(&prices, i, 1), Some(0.0));
        }
        assert_eq!(pct_change_at(&prices, 25, 20), Some(0.0));
    }

    #[test]
    fn rolling_std_sample_flavor() {
        // stdev of [2, 4, 4, 4, 5, 5, 7, 9] with n-1 denominator is ~2.138
        let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .iter()
            .map(|v| Some(*v))
            .collect();
        let s = rolling_std_at(&values, 7, 8);
        assert!((s - 2.13809).abs() < 1e-4);
    }

    #[test]
    fn rolling_std_needs_two_defined_values() {
        let values = [None, Some(1.0)];
        assert_eq!(rolling_std_at(&values, 1, 5), 0.0);
        assert_eq!(rolling_std_at(&values, 0, 5), 0.0);
    }

    #[test]
    fn rolling_std_zero_on_constant_returns() {
        let values: Vec<Option<f64>> = std::iter::once(None)
            .chain(std::iter::repeat(Some(0.0)).take(30))
            .collect();
        for end in 2..values.len() {
            assert_eq!(rolling_std_at(&values, end, 20), 0.0);
        }
    }

    #[test]
    fn rolling_std_clips_at_series_start() {
        let values: Vec<Option<f64>> = vec![Some(1.0), Some(3.0), Some(5.0)];
        // window longer than the available history still uses what exists
        let s = rolling_std_at(&values, 2, 10);
        assert!((s - 2.0).abs() < 1e-12);
    }
}
