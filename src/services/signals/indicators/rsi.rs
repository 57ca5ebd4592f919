//! Relative Strength Index (RSI).

/// Rolling average-gain/loss RSI over the trailing `period` deltas.
///
/// Close-to-close deltas are split into gains and losses, each smoothed
/// with a simple moving average over the window. RS = avg_gain / avg_loss,
/// RSI = 100 - 100 / (1 + RS). A zero average loss saturates the index at
/// 100 instead of propagating a division by zero.
///
/// Returns `None` when fewer than `period + 1` closes are available.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &deltas[deltas.len() - period..];

    let avg_gain: f64 = window.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
    let avg_loss: f64 = window.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
