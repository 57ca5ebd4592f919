//! Telegram delivery for scan reports.
//!
//! Credentials live in the settings store, so they can be rotated at
//! runtime without a restart.

use crate::error::{AppError, Result};
use crate::notify::Notifier;
use crate::services::store::{SqliteStore, SETTING_TELEGRAM_BOT_TOKEN, SETTING_TELEGRAM_CHAT_ID};
use crate::types::SignalRecord;
use reqwest::Client;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Reports cap out at this many records to stay under Telegram's message
/// limits and avoid spamming the channel.
const MAX_REPORT_RECORDS: usize = 10;

/// Render a titled report as Telegram Markdown.
pub fn format_report(title: &str, records: &[SignalRecord]) -> String {
    let mut message = format!("*Sentinel: {}*\n\n", title);

    for record in records.iter().take(MAX_REPORT_RECORDS) {
        message.push_str(&format!(
            "*{}* @ Rp {:.0}\n",
            record.ticker, record.current_price
        ));
        message.push_str(&format!(
            "   ATH dist: {:.2}% | Trend: {}\n",
            record.ath_distance_pct,
            record.trend_strength.label()
        ));
        match record.rsi {
            Some(rsi) => message.push_str(&format!(
                "   RSI: {:.1} | Vol: {:.1}x | Chg: {:+.2}%\n",
                rsi, record.vol_spike_ratio, record.price_change_pct
            )),
            None => message.push_str(&format!(
                "   Vol: {:.1}x | Chg: {:+.2}%\n",
                record.vol_spike_ratio, record.price_change_pct
            )),
        }
        message.push_str(&format!(
            "   Plan A (safe): SL Rp {:.0} | TP Rp {:.0}\n",
            record.plans.conservative.stop_loss, record.plans.conservative.take_profit
        ));
        message.push_str(&format!(
            "   Plan B (aggressive): SL Rp {:.0} | TP Rp {:.0}\n",
            record.plans.aggressive.stop_loss, record.plans.aggressive.take_profit
        ));
    }

    if records.len() > MAX_REPORT_RECORDS {
        message.push_str(&format!(
            "\n... and {} more.",
            records.len() - MAX_REPORT_RECORDS
        ));
    }

    message
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    client: Client,
    store: Arc<SqliteStore>,
}

impl TelegramNotifier {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, store }
    }

    fn credentials(&self) -> Result<(String, String)> {
        let token = self
            .store
            .get_setting(SETTING_TELEGRAM_BOT_TOKEN)?
            .filter(|t| !t.is_empty());
        let chat_id = self
            .store
            .get_setting(SETTING_TELEGRAM_CHAT_ID)?
            .filter(|c| !c.is_empty());

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Ok((token, chat_id)),
            _ => Err(AppError::Notifier(
                "Telegram credentials not configured".to_string(),
            )),
        }
    }

    /// Send a raw Markdown message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let (token, chat_id) = self.credentials()?;
        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notifier(format!(
                "Telegram API error {}: {}",
                status, body
            )));
        }

        debug!("Telegram message delivered ({} chars)", text.len());
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn send_report<'a>(
        &'a self,
        title: &'a str,
        records: &'a [SignalRecord],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if records.is_empty() {
                return Ok(());
            }
            let message = format_report(title, records);
            self.send_message(&message).await?;
            info!("Sent \"{}\" report: {} records", title, records.len());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TradePlan, TradePlans, TrendStrength};
    use chrono::NaiveDate;

    fn record(ticker: &str) -> SignalRecord {
        SignalRecord {
            ticker: ticker.to_string(),
            current_price: 9650.0,
            ath_price: 9800.0,
            ath_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            ath_distance_pct: -1.53,
            vol_spike_ratio: 2.4,
            price_change_pct: 1.25,
            rsi: Some(61.2),
            macd: Some(35.0),
            macd_signal: Some(28.0),
            is_breakout: true,
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
                    stop_loss: 9265.0,
                    take_profit: 10420.0,
                },
                aggressive: TradePlan {
                    stop_loss: 9165.0,
                    take_profit: 11095.0,
                },
            },
        }
    }

    #[test]
    fn test_format_report_includes_title_and_plans() {
        let message = format_report("Breakout Alert", &[record("BBCA")]);
        assert!(message.starts_with("*Sentinel: Breakout Alert*"));
        assert!(message.contains("*BBCA* @ Rp 9650"));
        assert!(message.contains("Plan A (safe): SL Rp 9265 | TP Rp 10420"));
        assert!(message.contains("Plan B (aggressive)"));
        assert!(message.contains("strong uptrend"));
    }

    #[test]
    fn test_format_report_caps_at_ten_records() {
        let records: Vec<SignalRecord> =
            (0..14).map(|i| record(&format!("TICK{:02}", i))).collect();
        let message = format_report("Oversold Alert (RSI < 30)", &records);
        assert!(message.contains("TICK09"));
        assert!(!message.contains("TICK10"));
        assert!(message.contains("... and 4 more."));
    }

    #[test]
    fn test_format_report_without_rsi() {
        let mut r = record("INAF");
        r.rsi = None;
        let message = format_report("Volatility Alert", &[r]);
        assert!(!message.contains("RSI:"));
        assert!(message.contains("Vol: 2.4x"));
    }
}
