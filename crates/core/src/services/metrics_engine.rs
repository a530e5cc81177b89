use std::collections::HashMap;

use crate::models::holding::Holding;
use crate::models::metrics::{DerivedHolding, PortfolioSummary};
use crate::models::price::{PricePoint, PriceSeries};

/// Computes derived per-holding rows and portfolio-level aggregates.
///
/// Pure and deterministic: no I/O, no hidden state, no clock. Given identical
/// holdings and price lookup, the output is always identical.
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Combine validated holdings with a ticker → latest-close lookup.
    ///
    /// Per row: `invested` is always defined; `current_value`, `profit_loss`
    /// and `return_pct` are `None` when the lookup has no price for the
    /// ticker. Rows with missing prices stay in the output but are excluded
    /// from the aggregate sums. `return_pct` also guards against a
    /// non-positive average price (the store filters those, but the engine
    /// must not assume it), and `total_return_pct` against a zero invested
    /// total — both yield `None`, never NaN or a panic.
    #[must_use]
    pub fn compute_metrics(
        &self,
        holdings: &[Holding],
        price_lookup: &HashMap<String, f64>,
    ) -> (Vec<DerivedHolding>, PortfolioSummary) {
        let mut rows = Vec::with_capacity(holdings.len());
        let mut total_invested = 0.0;
        let mut total_current_value = 0.0;
        let mut priced_count = 0;

        for holding in holdings {
            let current_price = price_lookup.get(&holding.ticker).copied();
            let invested = holding.quantity * holding.average_price;
            let current_value = current_price.map(|p| holding.quantity * p);
            let profit_loss = current_value.map(|v| v - invested);
            let return_pct = current_price.and_then(|p| {
                if holding.average_price > 0.0 {
                    Some((p / holding.average_price - 1.0) * 100.0)
                } else {
                    None
                }
            });

            if let Some(value) = current_value {
                total_invested += invested;
                total_current_value += value;
                priced_count += 1;
            }

            rows.push(DerivedHolding {
                holding: holding.clone(),
                current_price,
                invested,
                current_value,
                profit_loss,
                return_pct,
            });
        }

        let total_return_pct = if total_invested > 0.0 {
            Some((total_current_value / total_invested - 1.0) * 100.0)
        } else {
            None
        };

        let summary = PortfolioSummary {
            total_invested,
            total_current_value,
            total_profit_loss: total_current_value - total_invested,
            total_return_pct,
            asset_count: holdings.len(),
            priced_count,
        };

        (rows, summary)
    }

    /// Trend projection over an already-fetched series: a lazy, finite,
    /// restartable walk of the points, oldest first. Performs no fetching.
    pub fn trend<'a>(&self, series: &'a PriceSeries) -> impl Iterator<Item = &'a PricePoint> {
        series.trend()
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
