//! Analyzer, scanner, and scheduler tests against a mock provider.
//!
//! Covers the skip/degrade semantics at the analyzer boundary, order
//! preservation under concurrency, and the scheduler's partition routing.

use chrono::NaiveDate;
use sentinel::error::{AppError, Result};
use sentinel::notify::Notifier;
use sentinel::services::analyzer::{AnalysisOutcome, SkipReason, TickerAnalyzer};
use sentinel::services::cache::SeriesCache;
use sentinel::services::scanner::MarketScanner;
use sentinel::services::scheduler::ScanScheduler;
use sentinel::services::store::SqliteStore;
use sentinel::sources::provider::PriceProvider;
use sentinel::types::{PricePoint, PriceSeries, SignalRecord, TrendStrength};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

// =============================================================================
// Fixtures
// =============================================================================

fn point(day_offset: i64, close: f64, volume: f64) -> PricePoint {
    PricePoint {
        date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + chrono::Duration::days(day_offset),
        open: close,
        high: close + 5.0,
        low: close - 5.0,
        close,
        volume,
    }
}

/// 300 sessions sitting well below an old high: plenty of history, no
/// alert partition firing.
fn quiet_series() -> PriceSeries {
    PriceSeries::new(
        (0..300)
            .map(|i| {
                let close = if i < 100 { 1000.0 } else { 900.0 };
                point(i, close, 5000.0)
            })
            .collect(),
    )
}

/// 300 sessions ending within 2% of the historical high.
fn breakout_series() -> PriceSeries {
    let mut points: Vec<PricePoint> = (0..299).map(|i| point(i, 1000.0, 5000.0)).collect();
    // Last close 990 against highs of 1005: distance ~ -1.49%.
    points.push(PricePoint {
        date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + chrono::Duration::days(299),
        open: 985.0,
        high: 992.0,
        low: 980.0,
        close: 990.0,
        volume: 5000.0,
    });
    PriceSeries::new(points)
}

/// 104 rising weekly sessions.
fn weekly_series() -> PriceSeries {
    PriceSeries::new(
        (0..104)
            .map(|i| point(i * 7, 900.0 + i as f64 * 5.0, 1000.0))
            .collect(),
    )
}

/// Mock provider with per-symbol series, failures, and response delays.
#[derive(Default)]
struct MockProvider {
    daily: HashMap<String, PriceSeries>,
    weekly: HashMap<String, PriceSeries>,
    fail_daily: HashSet<String>,
    fail_weekly: HashSet<String>,
    delays_ms: HashMap<String, u64>,
}

impl MockProvider {
    fn with_daily(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.daily.insert(symbol.to_string(), series);
        self
    }

    fn with_weekly(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.weekly.insert(symbol.to_string(), series);
        self
    }

    fn failing_daily(mut self, symbol: &str) -> Self {
        self.fail_daily.insert(symbol.to_string());
        self
    }

    fn failing_weekly(mut self, symbol: &str) -> Self {
        self.fail_weekly.insert(symbol.to_string());
        self
    }

    fn with_delay(mut self, symbol: &str, ms: u64) -> Self {
        self.delays_ms.insert(symbol.to_string(), ms);
        self
    }
}

impl PriceProvider for MockProvider {
    fn fetch_daily_series<'a>(
        &'a self,
        symbol: &'a str,
        _period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(ms) = self.delays_ms.get(symbol) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.fail_daily.contains(symbol) {
                return Err(AppError::Provider(format!("connection reset: {}", symbol)));
            }
            self.daily
                .get(symbol)
                .cloned()
                .ok_or_else(|| AppError::Provider(format!("unknown symbol: {}", symbol)))
        })
    }

    fn fetch_weekly_series<'a>(
        &'a self,
        symbol: &'a str,
        _period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail_weekly.contains(symbol) {
                return Err(AppError::Provider(format!("connection reset: {}", symbol)));
            }
            self.weekly
                .get(symbol)
                .cloned()
                .ok_or_else(|| AppError::Provider(format!("unknown symbol: {}", symbol)))
        })
    }
}

fn analyzer_for(provider: MockProvider) -> Arc<TickerAnalyzer> {
    let cache = Arc::new(SeriesCache::new(Duration::from_secs(60)));
    Arc::new(TickerAnalyzer::new(Arc::new(provider), cache))
}

/// Notifier that records every report instead of delivering it.
#[derive(Default)]
struct RecordingNotifier {
    reports: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(title, _)| title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send_report<'a>(
        &'a self,
        title: &'a str,
        records: &'a [SignalRecord],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let tickers = records.iter().map(|r| r.ticker.clone()).collect();
            self.reports
                .lock()
                .unwrap()
                .push((title.to_string(), tickers));
            Ok(())
        })
    }
}

// =============================================================================
// Analyzer tests
// =============================================================================

mod analyzer_tests {
    use super::*;

    #[tokio::test]
    async fn test_happy_path_produces_suffix_free_record() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", breakout_series())
            .with_weekly("BBCA.JK", weekly_series());
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("BBCA").await;
        let AnalysisOutcome::Record(record) = outcome else {
            panic!("expected a record, got {:?}", outcome);
        };

        assert_eq!(record.ticker, "BBCA");
        assert!(record.is_breakout);
        assert!(record.ath_distance_pct > -2.0);
        assert_eq!(record.trend_strength, TrendStrength::Mild);
        assert!(record.is_weekly_uptrend);
        assert!(record.rsi.is_some());
        assert!(record.macd.is_some());
    }

    #[tokio::test]
    async fn test_suffixed_input_normalizes_to_same_identity() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", quiet_series())
            .with_weekly("BBCA.JK", weekly_series());
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("bbca.jk").await;
        let AnalysisOutcome::Record(record) = outcome else {
            panic!("expected a record");
        };
        assert_eq!(record.ticker, "BBCA");
    }

    #[tokio::test]
    async fn test_empty_series_is_skipped() {
        let provider = MockProvider::default().with_daily("NODATA.JK", PriceSeries::new(vec![]));
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("NODATA").await;
        assert!(matches!(
            outcome,
            AnalysisOutcome::Skipped(SkipReason::EmptySeries)
        ));
    }

    #[tokio::test]
    async fn test_single_session_is_insufficient() {
        let provider = MockProvider::default()
            .with_daily("THIN.JK", PriceSeries::new(vec![point(0, 1000.0, 5000.0)]));
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("THIN").await;
        assert!(matches!(
            outcome,
            AnalysisOutcome::Skipped(SkipReason::InsufficientHistory)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_skipped_not_propagated() {
        let provider = MockProvider::default().failing_daily("DEAD.JK");
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("DEAD").await;
        assert!(matches!(
            outcome,
            AnalysisOutcome::Skipped(SkipReason::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_weekly_failure_degrades_to_unknown_trend() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", quiet_series())
            .failing_weekly("BBCA.JK");
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("BBCA").await;
        let AnalysisOutcome::Record(record) = outcome else {
            panic!("weekly failure must not sink the record");
        };
        assert_eq!(record.trend_strength, TrendStrength::Unknown);
        assert!(!record.is_weekly_uptrend);
    }

    #[tokio::test]
    async fn test_two_sessions_is_enough_for_a_record() {
        let thin = PriceSeries::new(vec![point(0, 1000.0, 5000.0), point(1, 1010.0, 6000.0)]);
        let provider = MockProvider::default()
            .with_daily("NEW.JK", thin)
            .failing_weekly("NEW.JK");
        let analyzer = analyzer_for(provider);

        let outcome = analyzer.analyze("NEW").await;
        let AnalysisOutcome::Record(record) = outcome else {
            panic!("two sessions should produce a record");
        };
        // Short history: indicators degrade to None, flags to false.
        assert_eq!(record.rsi, None);
        assert_eq!(record.macd, None);
        assert!(!record.is_oversold);
        assert!(!record.is_golden_cross);
        assert!(!record.is_uptrend);
        assert!((record.price_change_pct - 1.0).abs() < 1e-9);
    }
}

// =============================================================================
// Scanner tests
// =============================================================================

mod scanner_tests {
    use super::*;

    fn scanner_with(provider: MockProvider, concurrency: usize) -> MarketScanner {
        MarketScanner::new(analyzer_for(provider), concurrency)
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let scanner = scanner_with(MockProvider::default(), 4);
        let result = tokio_test::block_on(scanner.scan(&[]));
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_failed_tickers_are_omitted_silently() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", quiet_series())
            .with_weekly("BBCA.JK", weekly_series())
            .failing_daily("DEAD.JK")
            .with_daily("TLKM.JK", quiet_series())
            .with_weekly("TLKM.JK", weekly_series());
        let scanner = scanner_with(provider, 4);

        let tickers = vec!["BBCA".to_string(), "DEAD".to_string(), "TLKM".to_string()];
        let result = scanner.scan(&tickers).await;

        let names: Vec<&str> = result.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(names, vec!["BBCA", "TLKM"]);
    }

    #[tokio::test]
    async fn test_result_order_is_input_order_despite_latency() {
        // The first ticker responds slowest; order must not change.
        let provider = MockProvider::default()
            .with_daily("AAAA.JK", quiet_series())
            .with_weekly("AAAA.JK", weekly_series())
            .with_delay("AAAA.JK", 80)
            .with_daily("BBBB.JK", quiet_series())
            .with_weekly("BBBB.JK", weekly_series())
            .with_delay("BBBB.JK", 20)
            .with_daily("CCCC.JK", quiet_series())
            .with_weekly("CCCC.JK", weekly_series());
        let scanner = scanner_with(provider, 3);

        let tickers = vec!["AAAA".to_string(), "BBBB".to_string(), "CCCC".to_string()];
        let result = scanner.scan(&tickers).await;

        let names: Vec<&str> = result.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(names, vec!["AAAA", "BBBB", "CCCC"]);
    }

    #[tokio::test]
    async fn test_duplicate_tickers_produce_one_record() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", quiet_series())
            .with_weekly("BBCA.JK", weekly_series());
        let scanner = scanner_with(provider, 4);

        let tickers = vec![
            "BBCA".to_string(),
            "bbca".to_string(),
            "BBCA.JK".to_string(),
        ];
        let result = scanner.scan(&tickers).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].ticker, "BBCA");
    }

    #[tokio::test]
    async fn test_concurrency_of_one_still_completes() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", quiet_series())
            .with_weekly("BBCA.JK", weekly_series())
            .with_daily("TLKM.JK", quiet_series())
            .with_weekly("TLKM.JK", weekly_series());
        let scanner = scanner_with(provider, 1);

        let tickers = vec!["BBCA".to_string(), "TLKM".to_string()];
        let result = scanner.scan(&tickers).await;
        assert_eq!(result.len(), 2);
    }
}

// =============================================================================
// Scheduler tests
// =============================================================================

mod scheduler_tests {
    use super::*;

    fn scheduler_fixture(
        provider: MockProvider,
    ) -> (
        Arc<ScanScheduler>,
        Arc<SqliteStore>,
        Arc<RecordingNotifier>,
        Arc<RwLock<Option<sentinel::types::ScanResult>>>,
    ) {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        let scanner = Arc::new(MarketScanner::new(analyzer_for(provider), 4));
        let notifier = Arc::new(RecordingNotifier::default());
        let latest = Arc::new(RwLock::new(None));
        let scheduler = Arc::new(ScanScheduler::new(
            scanner,
            store.clone(),
            notifier.clone(),
            latest.clone(),
        ));
        (scheduler, store, notifier, latest)
    }

    #[tokio::test]
    async fn test_start_stop_flag_transitions() {
        let (scheduler, _store, _notifier, _latest) = scheduler_fixture(MockProvider::default());

        assert!(!scheduler.is_running());
        scheduler
            .clone()
            .start(Duration::from_secs(3600), None)
            .unwrap();
        assert!(scheduler.is_running());

        // A second start while running is rejected.
        assert!(scheduler
            .clone()
            .start(Duration::from_secs(3600), None)
            .is_err());

        scheduler.stop();
        assert!(!scheduler.is_running());

        // Stopped scheduler can be started again.
        scheduler
            .clone()
            .start(Duration::from_secs(3600), None)
            .unwrap();
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_tick_persists_publishes_and_alerts() {
        let provider = MockProvider::default()
            .with_daily("BBCA.JK", breakout_series())
            .with_weekly("BBCA.JK", weekly_series());
        let (scheduler, store, notifier, latest) = scheduler_fixture(provider);

        store.add_monitored_ticker("BBCA").unwrap();
        scheduler.tick().await.unwrap();

        // Persisted.
        let cached = store.load_last_scan_result().unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached.records[0].ticker, "BBCA");

        // Published to the shared slot.
        assert!(latest.read().unwrap().is_some());

        // Breakout partition routed to the notifier.
        let titles = notifier.titles();
        assert!(titles.contains(&"Breakout Alert".to_string()));
    }

    #[tokio::test]
    async fn test_tick_with_empty_watchlist_is_a_noop() {
        let (scheduler, store, notifier, latest) = scheduler_fixture(MockProvider::default());

        scheduler.tick().await.unwrap();
        assert!(store.load_last_scan_result().unwrap().is_none());
        assert!(latest.read().unwrap().is_none());
        assert!(notifier.titles().is_empty());
    }

    #[tokio::test]
    async fn test_quiet_market_sends_no_reports() {
        let provider = MockProvider::default()
            .with_daily("KAEF.JK", quiet_series())
            .with_weekly("KAEF.JK", weekly_series());
        let (scheduler, store, notifier, _latest) = scheduler_fixture(provider);

        store.add_monitored_ticker("KAEF").unwrap();
        scheduler.tick().await.unwrap();

        // The pass completed but no partition qualified.
        assert_eq!(store.load_last_scan_result().unwrap().unwrap().len(), 1);
        assert!(notifier.titles().is_empty());
    }

    #[tokio::test]
    async fn test_provider_outage_leaves_empty_result_not_error() {
        let provider = MockProvider::default().failing_daily("BBCA.JK");
        let (scheduler, store, notifier, _latest) = scheduler_fixture(provider);

        store.add_monitored_ticker("BBCA").unwrap();
        scheduler.tick().await.unwrap();

        let cached = store.load_last_scan_result().unwrap();
        assert!(cached.is_none(), "an all-failed pass caches nothing");
        assert!(notifier.titles().is_empty());
    }
}
