//! SQLite persistence for settings, the monitored watchlist, and the
//! latest-scan cache.
//!
//! The scan cache exists to survive restarts; it is a cache, not a source
//! of truth, and each save replaces the previous pass entirely.

use crate::error::Result;
use crate::types::{ScanResult, SignalRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Scheduler interval in minutes.
pub const SETTING_SCAN_INTERVAL: &str = "SCAN_INTERVAL";
/// Local hour of day before which scheduled passes are skipped.
pub const SETTING_SCAN_START_HOUR: &str = "SCAN_START_HOUR";
pub const SETTING_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const SETTING_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Curated default watchlist: LQ45 big caps plus popular volatile names.
pub const DEFAULT_TICKERS: &[&str] = &[
    // Banks
    "BBCA", "BBRI", "BMRI", "BBNI", "BRIS", "ARTO",
    // Telco & tech
    "TLKM", "ISAT", "EXCL", "GOTO", "DMMX", "BUKA", "EMTK",
    // Energy & mining
    "ADRO", "PTBA", "ITMG", "BUMI", "BRMS", "ANTM", "INCO", "MDKA", "PGAS",
    "AKRA", "MEDC",
    // Consumer goods
    "UNVR", "ICBP", "INDF", "MYOR", "KLBF", "HMSP", "GGRM",
    // Auto & conglomerates
    "ASII", "UNTR",
    // Property & construction
    "BSDE", "CTRA", "PWON", "SMRA",
    // Volatile names
    "KAEF", "INAF", "DATA", "PANI", "CUAN", "BREN", "TPIA", "CGAS",
];

/// SQLite-backed store behind a single connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS watchlist (
                ticker TEXT PRIMARY KEY,
                added_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS latest_scan (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                record_json TEXT NOT NULL,
                scan_time INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Read a setting value.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Upsert a setting value.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // =========================================================================
    // Watchlist
    // =========================================================================

    /// All monitored tickers in insertion order.
    pub fn list_monitored_tickers(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT ticker FROM watchlist ORDER BY added_at, ticker")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut tickers = Vec::new();
        for row in rows {
            tickers.push(row?);
        }
        Ok(tickers)
    }

    /// Add a ticker to the watchlist. Returns false if it was already there.
    pub fn add_monitored_ticker(&self, ticker: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO watchlist (ticker, added_at) VALUES (?1, ?2)",
            params![ticker.trim().to_uppercase(), Utc::now().timestamp()],
        )?;
        Ok(changed > 0)
    }

    /// Remove a ticker. Returns false if it was not present.
    pub fn remove_monitored_ticker(&self, ticker: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "DELETE FROM watchlist WHERE ticker = ?1",
            params![ticker.trim().to_uppercase()],
        )?;
        Ok(changed > 0)
    }

    /// Seed the watchlist with the curated default list.
    /// Returns how many tickers were newly added.
    pub fn import_default_tickers(&self) -> Result<usize> {
        let mut added = 0;
        for ticker in DEFAULT_TICKERS {
            if self.add_monitored_ticker(ticker)? {
                added += 1;
            }
        }
        info!("Imported default watchlist: {} new tickers", added);
        Ok(added)
    }

    // =========================================================================
    // Latest scan cache
    // =========================================================================

    /// Replace the cached scan with this one, atomically: the previous rows
    /// are deleted and the new ones inserted in a single transaction, so a
    /// reader never sees a partially-written pass.
    pub fn save_scan_result(&self, result: &ScanResult) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM latest_scan", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO latest_scan (ticker, record_json, scan_time) VALUES (?1, ?2, ?3)",
            )?;
            for record in &result.records {
                let json = serde_json::to_string(record)?;
                stmt.execute(params![
                    record.ticker,
                    json,
                    result.completed_at.timestamp()
                ])?;
            }
        }
        tx.commit()?;
        debug!("Cached scan result: {} records", result.len());
        Ok(())
    }

    /// Load the most recently cached scan, or `None` if no pass has been
    /// saved (or the cache is empty).
    pub fn load_last_scan_result(&self) -> Result<Option<ScanResult>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT record_json, scan_time FROM latest_scan ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut records: Vec<SignalRecord> = Vec::new();
        let mut scan_time: Option<i64> = None;
        for row in rows {
            let (json, time) = row?;
            records.push(serde_json::from_str(&json)?);
            scan_time.get_or_insert(time);
        }

        let Some(time) = scan_time else {
            return Ok(None);
        };
        let completed_at = DateTime::<Utc>::from_timestamp(time, 0).unwrap_or_else(Utc::now);

        Ok(Some(ScanResult {
            records,
            completed_at,
        }))
    }
}
