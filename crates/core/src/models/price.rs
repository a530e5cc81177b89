use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single closing-price data point (date → close).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered series of daily closes for one ticker, ascending by date.
///
/// Providers are best-effort: a series may be partial (weekends, holidays,
/// provider gaps) or empty. Consumers must treat a missing latest close as
/// "price unavailable", never as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered points. Sorts ascending; on duplicate
    /// dates the last point wins.
    #[must_use]
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        let mut series = Self::new();
        for p in points {
            series.insert(p.date, p.close);
        }
        series
    }

    /// Insert or update a close for a date, keeping ascending order.
    /// Binary search, O(log n) lookup + O(n) shift.
    pub fn insert(&mut self, date: NaiveDate, close: f64) {
        match self.points.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => self.points[idx].close = close,
            Err(idx) => self.points.insert(idx, PricePoint { date, close }),
        }
    }

    /// The close at the latest available date, or `None` for an empty series.
    #[must_use]
    pub fn latest_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Lazy projection over the already-fetched points, oldest first —
    /// the sparkline feed. Borrows the series; performs no fetching.
    pub fn trend(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Per-ticker price series, as returned by one batched provider call.
/// Tickers the provider had no data for are simply absent.
pub type PriceHistory = HashMap<String, PriceSeries>;

/// Boundary adapter: reduce each series to its latest close.
///
/// Tickers with an empty or absent series are omitted from the lookup map —
/// downstream metrics already treat absence as "price unavailable".
#[must_use]
pub fn latest_closes(history: &PriceHistory) -> HashMap<String, f64> {
    history
        .iter()
        .filter_map(|(ticker, series)| {
            series.latest_close().map(|close| (ticker.clone(), close))
        })
        .collect()
}

/// Value cache for the most recent quote fetch.
///
/// Keyed by the (sorted) ticker set and the fetch timestamp. Exists purely to
/// bound call volume to the market-data provider within a refresh window —
/// correctness never depends on it. Expiry is checked against an injected
/// `now`, so tests can drive it with fixed timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCache {
    /// Sorted, deduplicated ticker set this fetch covered
    tickers: Vec<String>,

    /// When the fetch happened
    fetched_at: DateTime<Utc>,

    /// The fetched history
    history: PriceHistory,
}

impl QuoteCache {
    #[must_use]
    pub fn new(tickers: &[String], fetched_at: DateTime<Utc>, history: PriceHistory) -> Self {
        Self {
            tickers: Self::sorted_key(tickers),
            fetched_at,
            history,
        }
    }

    /// True when this cache entry covers exactly `tickers` and was fetched
    /// less than `ttl` before `now`.
    #[must_use]
    pub fn is_fresh(&self, tickers: &[String], now: DateTime<Utc>, ttl: Duration) -> bool {
        self.tickers == Self::sorted_key(tickers)
            && now.signed_duration_since(self.fetched_at) < ttl
    }

    #[must_use]
    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[must_use]
    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }

    fn sorted_key(tickers: &[String]) -> Vec<String> {
        let mut key: Vec<String> = tickers.to_vec();
        key.sort();
        key.dedup();
        key
    }
}
