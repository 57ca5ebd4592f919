//! Yahoo Finance API client for historical OHLCV data.
//!
//! Uses the unofficial chart API. IDX symbols are expected to carry their
//! `.JK` suffix by the time they reach this client.

use crate::config::FetchConfig;
use crate::error::{AppError, Result};
use crate::sources::provider::PriceProvider;
use crate::types::{PricePoint, PriceSeries};
use chrono::DateTime;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize a symbol for the Yahoo Finance API (uppercase).
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Yahoo Finance API client with timeout and retry behavior.
pub struct YahooFinanceClient {
    client: Client,
    fetch: FetchConfig,
}

impl YahooFinanceClient {
    /// Create a new client. Requests carry the configured timeout; transient
    /// failures are retried with exponential backoff and jitter.
    pub fn new(fetch: FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, fetch }
    }

    /// Fetch historical data for a symbol.
    ///
    /// Arguments:
    /// - symbol: full provider symbol (e.g. "BBCA.JK")
    /// - range: lookback ("1mo", "3mo", "1y", "2y", "5y", "max", ...)
    /// - interval: bar size ("1d", "1wk", ...)
    pub async fn get_historical_data(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceSeries> {
        let mut attempt = 1;
        loop {
            match self.request_chart(symbol, range, interval).await {
                Ok(series) => return Ok(series),
                Err(e) => {
                    let retryable = matches!(e, AppError::Reqwest(_));
                    if !retryable || attempt >= self.fetch.max_attempts {
                        return Err(e);
                    }
                    let backoff = self.fetch.backoff_base_ms * 2u64.pow(attempt - 1);
                    let jitter = rand::thread_rng().gen_range(0..=self.fetch.backoff_base_ms / 2);
                    warn!(
                        "Fetch attempt {}/{} for {} failed ({}), retrying in {}ms",
                        attempt,
                        self.fetch.max_attempts,
                        symbol,
                        e,
                        backoff + jitter
                    );
                    tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn request_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceSeries> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            yahoo_symbol, range, interval
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "API error for {}: {}",
                yahoo_symbol,
                response.status()
            )));
        }

        let data: YahooChartResponse = response.json().await?;

        if let Some(error) = data.chart.error {
            return Err(AppError::Provider(format!(
                "Yahoo API error: {} - {}",
                error.code, error.description
            )));
        }

        let result = data
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| AppError::Provider(format!("No results for {}", yahoo_symbol)))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| AppError::Provider("No timestamps in response".to_string()))?;

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider("No quote data in response".to_string()))?;

        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &timestamp) in timestamps.iter().enumerate() {
            let open = opens.get(i).and_then(|v| *v).unwrap_or(0.0);
            let high = highs.get(i).and_then(|v| *v).unwrap_or(0.0);
            let low = lows.get(i).and_then(|v| *v).unwrap_or(0.0);
            let close = closes.get(i).and_then(|v| *v).unwrap_or(0.0);
            let volume = volumes.get(i).and_then(|v| *v).unwrap_or(0) as f64;

            // Skip invalid sessions rather than polluting the series.
            if close <= 0.0 {
                continue;
            }

            let Some(date) = DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
            else {
                continue;
            };

            points.push(PricePoint {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(PriceSeries::new(points))
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl PriceProvider for YahooFinanceClient {
    fn fetch_daily_series<'a>(
        &'a self,
        symbol: &'a str,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>> {
        Box::pin(self.get_historical_data(symbol, period, "1d"))
    }

    fn fetch_weekly_series<'a>(
        &'a self,
        symbol: &'a str,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>> {
        Box::pin(self.get_historical_data(symbol, period, "1wk"))
    }
}
