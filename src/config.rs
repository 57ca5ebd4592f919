use std::env;

/// Provider fetch behavior.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts per fetch (1 = no retry).
    pub max_attempts: u32,
    /// Base backoff delay between retries (ms); doubled per attempt.
    pub backoff_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path.
    pub database_path: String,
    /// Maximum number of tickers analyzed concurrently per scan pass.
    pub scan_concurrency: usize,
    /// Default scheduler interval in seconds, used when no setting is stored.
    pub default_scan_interval_secs: u64,
    /// TTL for cached price series in seconds.
    pub series_cache_ttl_secs: u64,
    /// Provider fetch behavior.
    pub fetch: FetchConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "sentinel.db".to_string()),
            scan_concurrency: env::var("SCAN_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            default_scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            series_cache_ttl_secs: env::var("SERIES_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            fetch: FetchConfig {
                timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
                max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                backoff_base_ms: env::var("FETCH_BACKOFF_BASE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
