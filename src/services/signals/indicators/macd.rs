//! MACD (Moving Average Convergence Divergence).

use super::ema::ema_series;

/// MACD line and signal line for the two most recent sessions.
///
/// Keeping the previous pair lets the caller detect a strict crossing
/// instead of merely "currently above".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub prev_line: f64,
    pub prev_signal: f64,
}

impl Macd {
    /// Strict upward crossing between the previous and current session.
    pub fn is_golden_cross(&self) -> bool {
        self.prev_line < self.prev_signal && self.line > self.signal
    }
}

/// Compute MACD over the close series.
///
/// MACD line = EMA(fast) - EMA(slow), pointwise over the full series;
/// signal line = EMA(signal_span) of the MACD line.
///
/// Returns `None` when fewer than `slow + signal_span` closes are available.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Option<Macd> {
    if closes.len() < slow + signal_span {
        return None;
    }

    let fast_ema = ema_series(closes, fast)?;
    let slow_ema = ema_series(closes, slow)?;

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_series(&line, signal_span)?;

    let n = line.len();
    if n < 2 {
        return None;
    }

    Some(Macd {
        line: line[n - 1],
        signal: signal_line[n - 1],
        prev_line: line[n - 2],
        prev_signal: signal_line[n - 2],
    })
}
