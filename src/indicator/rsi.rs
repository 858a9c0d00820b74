/// Rolling-mean RSI over day-over-day price differences.
///
/// `rsi[i] = 100 - 100 / (1 + up_mean / abs_mean)` where `up_mean` is the
/// mean of positive differences and `abs_mean` the mean of absolute
/// differences across the `period` most recent differences. This is the
/// rolling-mean variant, not Wilder's recursive smoothing.
///
/// Undefined until `period` differences exist. A window with no movement at
/// all is reported as the neutral 50.0.
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }
    for i in period..closes.len() {
        let mut up_sum = 0.0;
        let mut abs_sum = 0.0;
        for j in (i + 1 - period)..=i {
            let diff = closes[j] - closes[j - 1];
            up_sum += diff.max(0.0);
            abs_sum += diff.abs();
        }
        let value = if abs_sum <= f64::EPSILON {
            50.0
        } else {
            let ratio = up_sum / abs_sum;
            100.0 - 100.0 / (1.0 + ratio)
        };
        out[i] = Some(value);
    }
    out
}
