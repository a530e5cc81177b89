use chrono::{DateTime, Duration, Utc};

use crate::errors::CoreError;
use crate::models::price::{PriceHistory, QuoteCache};
use crate::providers::traits::QuoteProvider;

/// Fetches trailing price history for a ticker set, with a time-boxed cache.
///
/// Cache strategy: one refresh cycle makes at most one batched provider call.
/// The result is kept for `ttl` (default 10 minutes) keyed by the ticker set;
/// a refresh within that window for the same set reuses it without touching
/// the network. The cache only bounds call volume — correctness never depends
/// on it. `now` is passed in by the caller so expiry is testable with fixed
/// timestamps.
///
/// Providers are tried in registration order; if the primary fails (API down,
/// rate limited) the next one gets a chance. Partial data for some tickers is
/// a success — downstream treats the missing ones as "price unavailable".
pub struct QuoteService {
    providers: Vec<Box<dyn QuoteProvider>>,
    cache: Option<QuoteCache>,
    ttl: Duration,
}

impl QuoteService {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn QuoteProvider>>, ttl: Duration) -> Self {
        Self {
            providers,
            cache: None,
            ttl,
        }
    }

    /// Change the cache TTL. Takes effect on the next freshness check.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Get ascending daily closes for `tickers` covering the trailing
    /// `lookback_days` window ending at `now`.
    ///
    /// 1. Fresh cache entry for the same ticker set → cloned, no network.
    /// 2. Otherwise fetch through the providers with fallback; first success
    ///    is cached with `fetched_at = now`.
    /// 3. All providers failed → the last error (`NoProvider` when none are
    ///    configured).
    pub async fn get_history(
        &mut self,
        tickers: &[String],
        lookback_days: u32,
        now: DateTime<Utc>,
    ) -> Result<PriceHistory, CoreError> {
        if let Some(cache) = &self.cache {
            if cache.is_fresh(tickers, now, self.ttl) {
                return Ok(cache.history().clone());
            }
        }

        let to = now.date_naive();
        let from = to - Duration::days(i64::from(lookback_days));

        if self.providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in &self.providers {
            match provider.fetch_history(tickers, from, to).await {
                Ok(history) => {
                    self.cache = Some(QuoteCache::new(tickers, now, history.clone()));
                    return Ok(history);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Drop the cached fetch result, forcing the next refresh to the network.
    pub fn cache_clear(&mut self) {
        self.cache = None;
    }

    /// When the cached fetch happened, if any.
    #[must_use]
    pub fn cache_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.cache.as_ref().map(QuoteCache::fetched_at)
    }

    /// Number of tickers the cached fetch covered.
    #[must_use]
    pub fn cached_ticker_count(&self) -> usize {
        self.cache.as_ref().map_or(0, QuoteCache::ticker_count)
    }

    /// Names of the configured providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}
