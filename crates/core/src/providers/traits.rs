use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::PriceHistory;

/// Trait abstraction for market-data providers.
///
/// Each quote API (brapi.dev, Yahoo Finance) implements this trait. If an API
/// stops working or changes, only that one implementation is replaced — the
/// rest of the codebase is untouched. Tests plug in mock implementations.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for errors).
    fn name(&self) -> &str;

    /// Fetch daily closes for `tickers` between `from` and `to` (inclusive),
    /// in one batched call per refresh cycle.
    ///
    /// The returned history is keyed by the caller's ticker strings, each
    /// series ascending by date. Best-effort per ticker: symbols the provider
    /// doesn't know are absent from the map, not errors. An `Err` means the
    /// whole fetch failed (network down, provider error).
    async fn fetch_history(
        &self,
        tickers: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceHistory, CoreError>;
}
