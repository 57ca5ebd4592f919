//! Background scan loop with cooperative cancellation.
//!
//! One controller owns the running flag and shutdown channel; callers go
//! through start/stop/is_running. A stop request takes effect during the
//! inter-scan wait, never after waiting out the full interval.

use crate::error::{AppError, Result};
use crate::notify::Notifier;
use crate::services::scanner::MarketScanner;
use crate::services::store::SqliteStore;
use crate::types::ScanResult;
use chrono::Timelike;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Partition titles forwarded to the notifier.
const BREAKOUT_TITLE: &str = "Breakout Alert";
const OVERSOLD_TITLE: &str = "Oversold Alert (RSI < 30)";
const GOLDEN_CROSS_TITLE: &str = "Golden Cross Alert";

/// Periodic market scanner that alerts on qualifying partitions.
pub struct ScanScheduler {
    scanner: Arc<MarketScanner>,
    store: Arc<SqliteStore>,
    notifier: Arc<dyn Notifier>,
    /// Most recently completed pass, shared with the interactive API.
    /// Written whole on completion; last writer wins.
    latest: Arc<RwLock<Option<ScanResult>>>,
    running: RwLock<bool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ScanScheduler {
    pub fn new(
        scanner: Arc<MarketScanner>,
        store: Arc<SqliteStore>,
        notifier: Arc<dyn Notifier>,
        latest: Arc<RwLock<Option<ScanResult>>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            scanner,
            store,
            notifier,
            latest,
            running: RwLock::new(false),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        *self.running.read().unwrap()
    }

    /// Start the background loop. Fails if it is already running.
    pub fn start(self: Arc<Self>, interval: Duration, start_hour: Option<u32>) -> Result<()> {
        {
            let mut running = self.running.write().unwrap();
            if *running {
                return Err(AppError::BadRequest(
                    "scheduler is already running".to_string(),
                ));
            }
            *running = true;
        }

        info!(
            "Scan scheduler started: interval {}s, start hour {:?}",
            interval.as_secs(),
            start_hour
        );

        tokio::spawn(async move {
            ScanScheduler::run_loop(self, interval, start_hour).await;
        });

        Ok(())
    }

    /// Request the loop to stop. Takes effect within the current wait.
    pub fn stop(&self) {
        *self.running.write().unwrap() = false;
        let _ = self.shutdown_tx.send(());
        info!("Scan scheduler stopped");
    }

    async fn run_loop(self: Arc<Self>, interval: Duration, start_hour: Option<u32>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            if !self.is_running() {
                break;
            }

            let before_start = start_hour
                .map(|hour| chrono::Local::now().hour() < hour)
                .unwrap_or(false);
            if before_start {
                debug!("Before configured start hour, skipping scan pass");
            } else if let Err(e) = self.tick().await {
                // One bad pass never terminates the loop.
                error!("Scan pass failed: {}", e);
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.recv() => break,
            }
        }
    }

    /// One scheduled pass: scan the watchlist, persist, publish, alert.
    pub async fn tick(&self) -> Result<()> {
        let tickers = self.store.list_monitored_tickers()?;
        if tickers.is_empty() {
            debug!("Watchlist empty, nothing to scan");
            return Ok(());
        }

        let result = self.scanner.scan(&tickers).await;
        self.store.save_scan_result(&result)?;
        *self.latest.write().unwrap() = Some(result.clone());
        self.dispatch_alerts(&result).await;
        Ok(())
    }

    async fn dispatch_alerts(&self, result: &ScanResult) {
        let partitions = [
            (BREAKOUT_TITLE, result.breakouts()),
            (OVERSOLD_TITLE, result.oversold()),
            (GOLDEN_CROSS_TITLE, result.golden_crosses()),
        ];

        for (title, records) in partitions {
            if records.is_empty() {
                continue;
            }
            if let Err(e) = self.notifier.send_report(title, &records).await {
                error!("Failed to send \"{}\" report: {}", title, e);
            }
        }
    }
}
