// ═══════════════════════════════════════════════════════════════════
// Integration Tests — FiiDashboard facade, full refresh cycles
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fii_dashboard_core::errors::CoreError;
use fii_dashboard_core::models::holding::Holding;
use fii_dashboard_core::models::price::{PriceHistory, PriceSeries};
use fii_dashboard_core::providers::traits::QuoteProvider;
use fii_dashboard_core::FiiDashboard;

const EPS: f64 = 1e-9;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn noon(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, day, 12, 0, 0).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Mock Provider
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    history: PriceHistory,
    calls: Arc<AtomicUsize>,
}

impl MockQuoteProvider {
    fn new(history: PriceHistory) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                history,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn fetch_history(
        &self,
        tickers: &[String],
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<PriceHistory, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .history
            .iter()
            .filter(|(t, _)| tickers.contains(*t))
            .map(|(t, s)| (t.clone(), s.clone()))
            .collect())
    }
}

struct FailingProvider;

#[async_trait]
impl QuoteProvider for FailingProvider {
    fn name(&self) -> &str {
        "FailingProvider"
    }

    async fn fetch_history(
        &self,
        _tickers: &[String],
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<PriceHistory, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }
}

/// A two-ticker history: A closed at 12.0 on the latest date, B at 18.0.
fn ab_history() -> PriceHistory {
    let mut history = PriceHistory::new();
    let mut a = PriceSeries::new();
    a.insert(d(2025, 8, 27), 11.0);
    a.insert(d(2025, 8, 28), 12.0);
    let mut b = PriceSeries::new();
    b.insert(d(2025, 8, 28), 18.0);
    history.insert("A11.SA".into(), a);
    history.insert("B11.SA".into(), b);
    history
}

fn ab_holdings() -> Vec<Holding> {
    vec![
        Holding::new("A11.SA", 10.0, 10.0, "Papel"),
        Holding::new("B11.SA", 5.0, 20.0, "Shopping"),
    ]
}

fn dashboard_with(history: PriceHistory) -> (FiiDashboard, Arc<AtomicUsize>) {
    let (provider, calls) = MockQuoteProvider::new(history);
    (FiiDashboard::with_providers(vec![Box::new(provider)]), calls)
}

// ═══════════════════════════════════════════════════════════════════
//  Full refresh cycle
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn refresh_produces_rows_summary_and_charts() {
    let (mut dashboard, _) = dashboard_with(ab_history());
    let rejected = dashboard.set_holdings(ab_holdings());
    assert!(rejected.is_empty());

    let view = dashboard.refresh_at(noon(29)).await;

    assert_eq!(view.fetch_error, None);
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].current_price, Some(12.0));
    assert!((view.rows[0].invested - 100.0).abs() < EPS);
    assert!((view.rows[0].profit_loss.unwrap() - 20.0).abs() < EPS);
    assert!((view.rows[1].return_pct.unwrap() - (-10.0)).abs() < EPS);

    assert!((view.summary.total_invested - 200.0).abs() < EPS);
    assert!((view.summary.total_current_value - 210.0).abs() < EPS);
    assert!((view.summary.total_profit_loss - 10.0).abs() < EPS);
    assert!((view.summary.total_return_pct.unwrap() - 5.0).abs() < EPS);

    // Sparkline for A has both trailing closes, in ascending order
    assert_eq!(view.trends[0].ticker, "A11.SA");
    assert_eq!(view.trends[0].points.len(), 2);
    assert!(view.trends[0].points[0].date < view.trends[0].points[1].date);

    // Both sectors priced → two slices summing to 100%
    assert_eq!(view.sector_allocation.len(), 2);
    let pct: f64 = view.sector_allocation.iter().map(|s| s.allocation_pct).sum();
    assert!((pct - 100.0).abs() < 1e-6);

    assert_eq!(view.comparison.len(), 2);
    assert_eq!(view.comparison[0].current_value, Some(120.0));
}

#[tokio::test]
async fn empty_portfolio_renders_empty_state_without_fetching() {
    let (mut dashboard, calls) = dashboard_with(ab_history());
    assert!(dashboard.is_empty());

    let view = dashboard.refresh_at(noon(29)).await;

    assert!(view.rows.is_empty());
    assert_eq!(view.summary.asset_count, 0);
    assert_eq!(view.fetch_error, None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_failure_degrades_to_unpriced_view() {
    let mut dashboard = FiiDashboard::with_providers(vec![Box::new(FailingProvider)]);
    dashboard.set_holdings(ab_holdings());

    let view = dashboard.refresh_at(noon(29)).await;

    // The render still happens — every price is just missing
    assert_eq!(view.rows.len(), 2);
    assert!(view.rows.iter().all(|r| r.current_price.is_none()));
    assert!((view.summary.total_current_value - 0.0).abs() < EPS);
    assert_eq!(view.summary.total_return_pct, None);
    assert!(view.sector_allocation.is_empty());
    assert!(view.fetch_error.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn partial_provider_data_prices_only_known_tickers() {
    let mut history = PriceHistory::new();
    let mut a = PriceSeries::new();
    a.insert(d(2025, 8, 28), 12.0);
    history.insert("A11.SA".into(), a);
    let (mut dashboard, _) = dashboard_with(history);
    dashboard.set_holdings(ab_holdings());

    let view = dashboard.refresh_at(noon(29)).await;

    assert_eq!(view.fetch_error, None);
    assert_eq!(view.rows[0].current_price, Some(12.0));
    assert_eq!(view.rows[1].current_price, None);
    assert_eq!(view.summary.priced_count, 1);
    // B's sparkline is an explicit empty series, not a dropped card
    assert_eq!(view.trends[1].ticker, "B11.SA");
    assert!(view.trends[1].points.is_empty());
}

// ═══════════════════════════════════════════════════════════════════
//  Cache behaviour through the facade
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn refresh_within_ttl_reuses_fetch() {
    let (mut dashboard, calls) = dashboard_with(ab_history());
    dashboard.set_holdings(ab_holdings());

    let t0 = noon(29);
    dashboard.refresh_at(t0).await;
    dashboard.refresh_at(t0 + Duration::minutes(9)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(dashboard.cache_fetched_at(), Some(t0));
}

#[tokio::test]
async fn refresh_after_ttl_fetches_again() {
    let (mut dashboard, calls) = dashboard_with(ab_history());
    dashboard.set_holdings(ab_holdings());

    let t0 = noon(29);
    dashboard.refresh_at(t0).await;
    dashboard.refresh_at(t0 + Duration::minutes(11)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn editing_holdings_busts_the_cache_by_ticker_set() {
    let (mut dashboard, calls) = dashboard_with(ab_history());
    dashboard.set_holdings(ab_holdings());
    let t0 = noon(29);
    dashboard.refresh_at(t0).await;

    // Drop one position — the ticker set changed, so a fresh fetch happens
    dashboard.set_holdings(vec![Holding::new("A11.SA", 10.0, 10.0, "Papel")]);
    dashboard.refresh_at(t0 + Duration::minutes(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn shorter_ttl_takes_effect() {
    let (mut dashboard, calls) = dashboard_with(ab_history());
    dashboard.set_holdings(ab_holdings());
    dashboard.set_cache_ttl_minutes(2).unwrap();

    let t0 = noon(29);
    dashboard.refresh_at(t0).await;
    dashboard.refresh_at(t0 + Duration::minutes(3)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ═══════════════════════════════════════════════════════════════════
//  Holdings editing & validation through the facade
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn rejected_rows_are_reported_and_excluded_from_refresh() {
    let (mut dashboard, _) = dashboard_with(ab_history());
    let rejected = dashboard.set_holdings(vec![
        Holding::new("A11.SA", 10.0, 10.0, "Papel"),
        Holding::new("", 1.0, 1.0, ""),
        Holding::new("A11.SA", 99.0, 1.0, "Papel"),
    ]);

    assert_eq!(rejected.len(), 2);
    assert_eq!(dashboard.get_tickers(), vec!["A11.SA"]);

    let view = dashboard.refresh_at(noon(29)).await;
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.summary.asset_count, 1);
}

#[test]
fn sample_portfolio_seeds_five_positions() {
    let dashboard = FiiDashboard::with_sample_portfolio();
    assert_eq!(dashboard.holdings().len(), 5);
    assert!(!dashboard.is_empty());
    assert_eq!(dashboard.get_tickers()[0], "MXRF11.SA");
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

#[test]
fn lookback_bounds_are_enforced() {
    let mut dashboard = FiiDashboard::new();
    assert!(dashboard.set_lookback_days(0).is_err());
    assert!(dashboard.set_lookback_days(366).is_err());
    assert!(dashboard.set_lookback_days(30).is_ok());
    assert_eq!(dashboard.settings().lookback_days, 30);
}

#[test]
fn cache_ttl_must_be_positive() {
    let mut dashboard = FiiDashboard::new();
    assert!(dashboard.set_cache_ttl_minutes(0).is_err());
    assert!(dashboard.set_cache_ttl_minutes(-5).is_err());
    assert!(dashboard.set_cache_ttl_minutes(15).is_ok());
    assert_eq!(dashboard.settings().cache_ttl_minutes, 15);
}

#[test]
fn api_key_roundtrip_rebuilds_providers() {
    let mut dashboard = FiiDashboard::new();
    dashboard.set_api_key("brapi".into(), "secret".into());
    assert_eq!(dashboard.settings().api_keys.get("brapi").unwrap(), "secret");
    assert!(dashboard.provider_names().contains(&"brapi".to_string()));

    assert!(dashboard.remove_api_key("brapi"));
    assert!(!dashboard.remove_api_key("brapi"));
}

// ═══════════════════════════════════════════════════════════════════
//  Export
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn view_exports_csv_and_json() {
    let (mut dashboard, _) = dashboard_with(ab_history());
    dashboard.set_holdings(ab_holdings());

    let view = dashboard.refresh_at(noon(29)).await;
    let csv = view.rows_to_csv();
    assert!(csv.starts_with("ticker,"));
    assert_eq!(csv.lines().count(), 3);

    let json = view.to_json().unwrap();
    assert!(json.contains("\"total_invested\""));
}
