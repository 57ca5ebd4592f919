pub mod analyzer;
pub mod cache;
pub mod scanner;
pub mod scheduler;
pub mod signals;
pub mod store;

pub use analyzer::{AnalysisOutcome, SkipReason, TickerAnalyzer};
pub use cache::SeriesCache;
pub use scanner::MarketScanner;
pub use scheduler::ScanScheduler;
pub use store::SqliteStore;
