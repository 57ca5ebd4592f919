//! Threshold rules that turn indicator outputs and raw OHLC values into
//! boolean/categorical signals.

use crate::services::signals::indicators::ema;
use crate::types::{PricePoint, PriceSeries, TrendStrength};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const EMA_FAST: usize = 50;
pub const EMA_SLOW: usize = 200;
pub const WEEKLY_EMA_SPAN: usize = 20;
/// Minimum weekly sessions before the weekly trend leg is trusted.
pub const MIN_WEEKLY_SESSIONS: usize = 21;
pub const VOLUME_WINDOW: usize = 20;

const BREAKOUT_DISTANCE_PCT: f64 = -2.0;
const VOLUME_SPIKE_RATIO: f64 = 3.0;
const PRICE_MOVE_PCT: f64 = 5.0;
const OVERSOLD_RSI: f64 = 30.0;
const DOJI_BODY_RATIO: f64 = 0.05;
const HAMMER_LOWER_RATIO: f64 = 0.6;
const HAMMER_UPPER_RATIO: f64 = 0.1;

/// Distance of the last close from the all-time high, in percent.
/// Negative below the high, zero at it.
pub fn ath_distance_pct(last_close: f64, ath: f64) -> f64 {
    (last_close - ath) / ath * 100.0
}

/// Within 2% of the historical high. The boundary is inclusive.
pub fn is_breakout(distance_pct: f64) -> bool {
    distance_pct >= BREAKOUT_DISTANCE_PCT
}

/// Last-session volume against the prior baseline.
/// A zero baseline reads as flat (1.0), not a spike.
pub fn vol_spike_ratio(last_volume: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        1.0
    } else {
        last_volume / baseline
    }
}

/// Percent change of the close against the immediately preceding session.
pub fn price_change_pct(prev_close: f64, last_close: f64) -> f64 {
    (last_close - prev_close) / prev_close * 100.0
}

/// Volume ratio strictly above 3x, or an absolute price move above 5%.
pub fn is_volatile(vol_spike_ratio: f64, price_change_pct: f64) -> bool {
    vol_spike_ratio > VOLUME_SPIKE_RATIO || price_change_pct.abs() > PRICE_MOVE_PCT
}

pub fn is_oversold(rsi: f64) -> bool {
    rsi < OVERSOLD_RSI
}

/// Candlestick shape of a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleShape {
    pub is_doji: bool,
    pub is_hammer: bool,
}

/// Classify the latest session's candle.
///
/// A zero-range session signals missing or bad data, not indecision, and is
/// neither doji nor hammer.
pub fn classify_candle(p: &PricePoint) -> CandleShape {
    let range = p.high - p.low;
    if range <= 0.0 {
        return CandleShape {
            is_doji: false,
            is_hammer: false,
        };
    }

    let body = (p.close - p.open).abs();
    let upper_shadow = p.high - p.open.max(p.close);
    let lower_shadow = p.open.min(p.close) - p.low;

    CandleShape {
        is_doji: body <= DOJI_BODY_RATIO * range,
        is_hammer: lower_shadow >= HAMMER_LOWER_RATIO * range
            && upper_shadow <= HAMMER_UPPER_RATIO * range,
    }
}

/// Daily trend leg: EMA(50) above EMA(200).
/// Too little history to compute either counts as not-up.
pub fn daily_uptrend(closes: &[f64]) -> bool {
    match (ema::ema(closes, EMA_FAST), ema::ema(closes, EMA_SLOW)) {
        (Some(fast), Some(slow)) => fast > slow,
        _ => false,
    }
}

/// Weekly trend leg: last weekly close above the weekly EMA(20).
/// `None` when the series is shorter than the minimum window.
pub fn weekly_uptrend(weekly: &PriceSeries) -> Option<bool> {
    if weekly.len() < MIN_WEEKLY_SESSIONS {
        return None;
    }
    let closes = weekly.closes();
    let ema20 = ema::ema(&closes, WEEKLY_EMA_SPAN)?;
    let last = *closes.last()?;
    Some(last > ema20)
}

/// Fuse the daily and weekly legs into the ordered trend categorical.
pub fn trend_strength(closes: &[f64], weekly: Option<&PriceSeries>) -> TrendStrength {
    let daily_up = daily_uptrend(closes);
    let weekly_up = weekly.and_then(weekly_uptrend);
    TrendStrength::fuse(daily_up, weekly_up)
}
