//! Sentinel - market scan and alert server for IDX equities.
//!
//! Pulls daily and weekly OHLCV history per ticker, computes indicators and
//! threshold signals, aggregates a scan pass across the watchlist, and
//! pushes qualifying partitions to a Telegram channel.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod services;
pub mod sources;
pub mod types;

use config::Config;
use services::{MarketScanner, ScanScheduler, SqliteStore};
use std::sync::{Arc, RwLock};
use types::ScanResult;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SqliteStore>,
    pub scanner: Arc<MarketScanner>,
    pub scheduler: Arc<ScanScheduler>,
    /// Most recently completed pass. Written whole by whichever scan
    /// finishes; last writer wins.
    pub latest: Arc<RwLock<Option<ScanResult>>>,
}
