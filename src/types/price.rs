//! Price history types shared by the provider, indicators, and classifier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading session of OHLCV data. Immutable once fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered daily or weekly price history for one ticker.
///
/// Dates are strictly increasing with no duplicates; construction sorts the
/// input and drops duplicate sessions so the invariant always holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw points, enforcing the ordering invariant.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent session.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Close prices in session order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Volumes in session order.
    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    /// Highest High over the whole series with its session date.
    /// Ties resolve to the earliest session.
    pub fn all_time_high(&self) -> Option<(f64, NaiveDate)> {
        self.points.iter().fold(None, |best, p| match best {
            Some((high, date)) if high >= p.high => Some((high, date)),
            _ => Some((p.high, p.date)),
        })
    }
}
