pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, Duration, Utc};

use models::{
    chart::DashboardView,
    holding::{Holding, RejectedHolding},
    metrics::PortfolioSummary,
    price::{latest_closes, PriceHistory},
    settings::Settings,
};
use providers::brapi::BrapiProvider;
use providers::traits::QuoteProvider;
#[cfg(not(target_arch = "wasm32"))]
use providers::yahoo_finance::YahooFinanceProvider;
use services::{
    chart_service::ChartService, metrics_engine::MetricsEngine,
    portfolio_store::PortfolioStore, quote_service::QuoteService,
};

use errors::CoreError;

/// Widest accepted trailing price window (1 year).
const MAX_LOOKBACK_DAYS: u32 = 365;

/// Main entry point for the FII Dashboard core library.
///
/// Owns the editable holdings table, the quote fetch layer, and the pure
/// metrics/chart computation. One `refresh()` produces a complete
/// [`DashboardView`] for the presentation layer to render.
#[must_use]
pub struct FiiDashboard {
    store: PortfolioStore,
    settings: Settings,
    quote_service: QuoteService,
    metrics_engine: MetricsEngine,
    chart_service: ChartService,
}

impl std::fmt::Debug for FiiDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiiDashboard")
            .field("holdings", &self.store.holdings().len())
            .field("settings", &self.settings)
            .field("cache_fetched_at", &self.quote_service.cache_fetched_at())
            .finish()
    }
}

impl FiiDashboard {
    /// Create an empty dashboard with default settings and the default
    /// provider chain (brapi first, Yahoo Finance as fallback on native
    /// targets).
    pub fn new() -> Self {
        let settings = Settings::default();
        let providers = Self::default_providers(&settings);
        Self::build(settings, providers)
    }

    /// Create a dashboard with an explicit provider chain, tried in order.
    /// Used by tests and embedders that bring their own market-data source.
    pub fn with_providers(providers: Vec<Box<dyn QuoteProvider>>) -> Self {
        Self::build(Settings::default(), providers)
    }

    /// Create a dashboard pre-seeded with the five sample FII positions,
    /// so a first launch isn't an empty screen.
    pub fn with_sample_portfolio() -> Self {
        let mut dashboard = Self::new();
        dashboard.set_holdings(models::holding::sample_portfolio());
        dashboard
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Replace the holdings table. Invalid rows are dropped and returned
    /// with reasons — never an error, for any input shape.
    pub fn set_holdings(&mut self, rows: Vec<Holding>) -> Vec<RejectedHolding> {
        self.store.set_holdings(rows)
    }

    /// The normalized holdings table, in insertion order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        self.store.holdings()
    }

    /// Unique tickers currently held, in insertion order.
    #[must_use]
    pub fn get_tickers(&self) -> Vec<String> {
        self.store.get_tickers()
    }

    /// True when no valid holdings remain — a "nothing to display" state,
    /// not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Run one refresh cycle as of now: snapshot holdings, fetch trailing
    /// closes (cache-aware), compute metrics and chart data.
    pub async fn refresh(&mut self) -> DashboardView {
        self.refresh_at(Utc::now()).await
    }

    /// Run one refresh cycle with an explicit clock. Cache expiry is judged
    /// against `now`, so tests can drive the TTL with fixed timestamps.
    ///
    /// A total fetch failure degrades to a view with every price missing and
    /// `fetch_error` set — it never propagates as an error.
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> DashboardView {
        let tickers = self.store.get_tickers();

        if tickers.is_empty() {
            // Explicit "add holdings" empty state — no fetch performed
            return DashboardView {
                as_of: now,
                rows: Vec::new(),
                summary: PortfolioSummary::empty(0),
                trends: Vec::new(),
                sector_allocation: Vec::new(),
                comparison: Vec::new(),
                fetch_error: None,
            };
        }

        let (history, fetch_error) = match self
            .quote_service
            .get_history(&tickers, self.settings.lookback_days, now)
            .await
        {
            Ok(history) => (history, None),
            Err(e) => (PriceHistory::new(), Some(e.to_string())),
        };

        let price_lookup = latest_closes(&history);
        let (rows, summary) = self
            .metrics_engine
            .compute_metrics(self.store.holdings(), &price_lookup);

        DashboardView {
            as_of: now,
            trends: self.chart_service.ticker_trends(self.store.holdings(), &history),
            sector_allocation: self.chart_service.sector_allocation(&rows),
            comparison: self.chart_service.invested_vs_current(&rows),
            rows,
            summary,
            fetch_error,
        }
    }

    // ── Cache Management ────────────────────────────────────────────

    /// Drop the cached fetch, forcing the next refresh to the network.
    pub fn cache_clear(&mut self) {
        self.quote_service.cache_clear();
    }

    /// When the cached fetch happened, if any.
    #[must_use]
    pub fn cache_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.quote_service.cache_fetched_at()
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Set the trailing price window in days (1 to 365).
    pub fn set_lookback_days(&mut self, days: u32) -> Result<(), CoreError> {
        if days == 0 || days > MAX_LOOKBACK_DAYS {
            return Err(CoreError::ValidationError(format!(
                "Lookback of {days} days is outside 1..={MAX_LOOKBACK_DAYS}"
            )));
        }
        self.settings.lookback_days = days;
        Ok(())
    }

    /// Set how long one fetch result stays fresh, in minutes (must be > 0).
    pub fn set_cache_ttl_minutes(&mut self, minutes: i64) -> Result<(), CoreError> {
        if minutes <= 0 {
            return Err(CoreError::ValidationError(format!(
                "Cache TTL must be positive, got {minutes} minutes"
            )));
        }
        self.settings.cache_ttl_minutes = minutes;
        self.quote_service.set_ttl(Duration::minutes(minutes));
        Ok(())
    }

    /// Set an API token for a provider (e.g., "brapi").
    /// Rebuilds the provider chain so the token takes effect immediately;
    /// the cached fetch is dropped.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        self.rebuild_providers();
    }

    /// Remove an API token for a provider. Returns whether one was removed.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_providers();
        }
        removed
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Names of the configured providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.quote_service.provider_names()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: Settings, providers: Vec<Box<dyn QuoteProvider>>) -> Self {
        let ttl = Duration::minutes(settings.cache_ttl_minutes);
        Self {
            store: PortfolioStore::new(),
            quote_service: QuoteService::new(providers, ttl),
            metrics_engine: MetricsEngine::new(),
            chart_service: ChartService::new(),
            settings,
        }
    }

    fn default_providers(settings: &Settings) -> Vec<Box<dyn QuoteProvider>> {
        let mut providers: Vec<Box<dyn QuoteProvider>> = Vec::new();

        // brapi — B3-native, batched, optional token (primary)
        providers.push(Box::new(BrapiProvider::new(
            settings.api_keys.get("brapi").cloned(),
        )));

        // Yahoo Finance — per-ticker fallback, no key needed.
        // Not available on WASM (uses native reqwest/tokio connectors).
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                providers.push(Box::new(yahoo));
            }
        }

        providers
    }

    fn rebuild_providers(&mut self) {
        let providers = Self::default_providers(&self.settings);
        let ttl = Duration::minutes(self.settings.cache_ttl_minutes);
        self.quote_service = QuoteService::new(providers, ttl);
    }
}

impl Default for FiiDashboard {
    fn default() -> Self {
        Self::new()
    }
}
