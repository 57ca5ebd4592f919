//! Scan output types: per-ticker signal records and the aggregated result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fused daily + weekly trend classification.
///
/// The precedence is load-bearing: weekly-only (pullback) and daily-only
/// (reversal risk) are distinct states and must never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    /// Daily and weekly both up.
    Strong,
    /// Weekly up, daily down: a pullback inside a larger uptrend.
    Mild,
    /// Daily up, weekly down: short-term strength with reversal risk.
    Weak,
    /// Neither timeframe up.
    Down,
    /// Weekly series unavailable or too short to trust.
    Unknown,
}

impl TrendStrength {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "strong uptrend",
            Self::Mild => "mild uptrend (pullback)",
            Self::Weak => "weak uptrend (reversal risk)",
            Self::Down => "downtrend",
            Self::Unknown => "unknown",
        }
    }

    /// Fuse the two trend legs. `weekly_up` is `None` when the weekly series
    /// is unavailable or shorter than the minimum window.
    pub fn fuse(daily_up: bool, weekly_up: Option<bool>) -> Self {
        match (weekly_up, daily_up) {
            (None, _) => Self::Unknown,
            (Some(true), true) => Self::Strong,
            (Some(true), false) => Self::Mild,
            (Some(false), true) => Self::Weak,
            (Some(false), false) => Self::Down,
        }
    }
}

/// One suggested exit plan: stop-loss and take-profit price levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Both candidate exit plans for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlans {
    /// Risk 4%, reward 8% (1:2).
    pub conservative: TradePlan,
    /// Risk 5%, reward 15% (1:3).
    pub aggressive: TradePlan,
}

/// Full output of analyzing one ticker for one scan pass.
///
/// Superseded entirely by the next scan; never merged with prior results.
/// Indicator values are `None` when the history is too short to compute
/// them, never zero or a guessed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRecord {
    /// Ticker symbol without the exchange suffix.
    pub ticker: String,
    pub current_price: f64,
    pub ath_price: f64,
    pub ath_date: NaiveDate,
    /// Distance of the last close from the all-time high, in percent
    /// (negative below the high).
    pub ath_distance_pct: f64,
    pub vol_spike_ratio: f64,
    pub price_change_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    pub is_breakout: bool,
    pub is_volatile: bool,
    pub is_oversold: bool,
    pub is_golden_cross: bool,
    /// Daily EMA(50) above EMA(200).
    pub is_uptrend: bool,
    /// Last weekly close above weekly EMA(20). False when unknown.
    pub is_weekly_uptrend: bool,
    pub trend_strength: TrendStrength,
    pub is_doji: bool,
    pub is_hammer: bool,
    pub plans: TradePlans,
}

/// One completed scan pass: records in input order, one per successfully
/// analyzed ticker. Failed tickers are omitted, never placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub records: Vec<SignalRecord>,
    pub completed_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn new(records: Vec<SignalRecord>) -> Self {
        Self {
            records,
            completed_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records within 2% of their all-time high.
    pub fn breakouts(&self) -> Vec<SignalRecord> {
        self.filtered(|r| r.is_breakout)
    }

    /// Records with RSI below the oversold threshold.
    pub fn oversold(&self) -> Vec<SignalRecord> {
        self.filtered(|r| r.is_oversold)
    }

    /// Records where the MACD line crossed above its signal line.
    pub fn golden_crosses(&self) -> Vec<SignalRecord> {
        self.filtered(|r| r.is_golden_cross)
    }

    fn filtered(&self, keep: impl Fn(&SignalRecord) -> bool) -> Vec<SignalRecord> {
        self.records.iter().filter(|r| keep(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(ticker: &str) -> SignalRecord {
        SignalRecord {
            ticker: ticker.to_string(),
            current_price: 1000.0,
            ath_price: 1100.0,
            ath_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ath_distance_pct: -9.1,
            vol_spike_ratio: 1.0,
            price_change_pct: 0.5,
            rsi: Some(55.0),
            macd: Some(1.2),
            macd_signal: Some(0.8),
            is_breakout: false,
            is_volatile: false,
            is_oversold: false,
            is_golden_cross: false,
            is_uptrend: true,
            is_weekly_uptrend: true,
            trend_strength: TrendStrength::Strong,
            is_doji: false,
            is_hammer: false,
            plans: TradePlans {
                conservative: TradePlan {
                    stop_loss: 960.0,
                    take_profit: 1080.0,
                },
                aggressive: TradePlan {
                    stop_loss: 950.0,
                    take_profit: 1150.0,
                },
            },
        }
    }

    #[test]
    fn test_trend_fuse_precedence() {
        assert_eq!(TrendStrength::fuse(true, Some(true)), TrendStrength::Strong);
        assert_eq!(TrendStrength::fuse(false, Some(true)), TrendStrength::Mild);
        assert_eq!(TrendStrength::fuse(true, Some(false)), TrendStrength::Weak);
        assert_eq!(TrendStrength::fuse(false, Some(false)), TrendStrength::Down);
        assert_eq!(TrendStrength::fuse(true, None), TrendStrength::Unknown);
        assert_eq!(TrendStrength::fuse(false, None), TrendStrength::Unknown);
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(TrendStrength::Strong.label(), "strong uptrend");
        assert_eq!(TrendStrength::Mild.label(), "mild uptrend (pullback)");
        assert_eq!(TrendStrength::Weak.label(), "weak uptrend (reversal risk)");
        assert_eq!(TrendStrength::Down.label(), "downtrend");
        assert_eq!(TrendStrength::Unknown.label(), "unknown");
    }

    #[test]
    fn test_scan_result_partitions() {
        let mut breakout = sample_record("AAAA");
        breakout.is_breakout = true;
        let mut oversold = sample_record("BBBB");
        oversold.is_oversold = true;
        let mut cross = sample_record("CCCC");
        cross.is_golden_cross = true;

        let result = ScanResult::new(vec![breakout, oversold, cross]);
        assert_eq!(result.breakouts().len(), 1);
        assert_eq!(result.breakouts()[0].ticker, "AAAA");
        assert_eq!(result.oversold().len(), 1);
        assert_eq!(result.oversold()[0].ticker, "BBBB");
        assert_eq!(result.golden_crosses().len(), 1);
        assert_eq!(result.golden_crosses()[0].ticker, "CCCC");
    }

    #[test]
    fn test_record_serialization_skips_missing_indicators() {
        let mut record = sample_record("DDDD");
        record.rsi = None;
        record.macd = None;
        record.macd_signal = None;

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"rsi\""));
        assert!(!json.contains("\"macd\""));

        let back: SignalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rsi, None);
        assert_eq!(back, record);
    }
}
