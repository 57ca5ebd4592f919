//! Outbound alert transport.

pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::error::Result;
use crate::types::SignalRecord;
use std::future::Future;
use std::pin::Pin;

/// Delivery seam for titled scan reports.
///
/// Delivery success or failure is the notifier's concern; the scheduler
/// logs failures and moves on.
pub trait Notifier: Send + Sync {
    /// Send a titled report covering the given records.
    fn send_report<'a>(
        &'a self,
        title: &'a str,
        records: &'a [SignalRecord],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
