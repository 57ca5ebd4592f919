//! Market scanner: runs the analyzer across a ticker list with bounded
//! concurrency and collects the surviving records.

use crate::services::analyzer::{display_ticker, AnalysisOutcome, TickerAnalyzer};
use crate::types::ScanResult;
use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrates one scan pass over a list of tickers.
///
/// Per-ticker analyses are independent, so they run concurrently up to the
/// configured cap (the provider is a rate-limited external service). The
/// buffered stream yields results in input order, so the final result set
/// never depends on completion order.
pub struct MarketScanner {
    analyzer: Arc<TickerAnalyzer>,
    concurrency: usize,
}

impl MarketScanner {
    pub fn new(analyzer: Arc<TickerAnalyzer>, concurrency: usize) -> Self {
        Self {
            analyzer,
            concurrency: concurrency.max(1),
        }
    }

    /// Run one scan pass. Tickers that fail or lack history are omitted;
    /// duplicates analyze once (first occurrence wins); an empty input
    /// yields an empty result.
    pub async fn scan(&self, tickers: &[String]) -> ScanResult {
        let mut seen = HashSet::new();
        let unique: Vec<String> = tickers
            .iter()
            .filter(|t| seen.insert(display_ticker(t)))
            .cloned()
            .collect();

        let total = unique.len();
        let concurrency = self.concurrency;
        let outcomes: Vec<AnalysisOutcome> = stream::iter(unique.clone())
            .map(|ticker| {
                let analyzer = self.analyzer.clone();
                async move { analyzer.analyze(&ticker).await }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut records = Vec::with_capacity(outcomes.len());
        for (ticker, outcome) in unique.iter().zip(outcomes) {
            match outcome {
                AnalysisOutcome::Record(record) => records.push(*record),
                AnalysisOutcome::Skipped(reason) => {
                    debug!("Omitting {} from scan: {}", ticker, reason.label());
                }
            }
        }

        info!(
            "Scan pass complete: {}/{} tickers produced records",
            records.len(),
            total
        );
        ScanResult::new(records)
    }
}
