use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// A holding enriched with the live price and computed profit/loss figures.
///
/// Every field that depends on the current price is `Option<f64>`: when the
/// provider returned no data for the ticker, those fields are `None` so the
/// frontend can render "price unavailable" instead of a misleading R$ 0,00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedHolding {
    /// The underlying holding
    pub holding: Holding,

    /// Latest known close for the ticker, if any
    pub current_price: Option<f64>,

    /// quantity × average_price — always defined
    pub invested: f64,

    /// quantity × current_price
    pub current_value: Option<f64>,

    /// current_value − invested
    pub profit_loss: Option<f64>,

    /// (current_price / average_price − 1) × 100.
    /// `None` when the price is missing or average_price is not positive.
    pub return_pct: Option<f64>,
}

/// Aggregate totals across one refresh cycle.
///
/// Sums cover only rows with a defined `current_value`; rows with missing
/// price data stay in the per-row output but never enter the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Σ invested over priced rows
    pub total_invested: f64,

    /// Σ current_value over priced rows
    pub total_current_value: f64,

    /// total_current_value − total_invested
    pub total_profit_loss: f64,

    /// (total_current_value / total_invested − 1) × 100,
    /// `None` when total_invested is zero
    pub total_return_pct: Option<f64>,

    /// Number of valid holdings in the portfolio (priced or not)
    pub asset_count: usize,

    /// Number of rows that entered the aggregate sums
    pub priced_count: usize,
}

impl PortfolioSummary {
    /// Summary of an empty (or entirely unpriced) portfolio.
    #[must_use]
    pub fn empty(asset_count: usize) -> Self {
        Self {
            total_invested: 0.0,
            total_current_value: 0.0,
            total_profit_loss: 0.0,
            total_return_pct: None,
            asset_count,
            priced_count: 0,
        }
    }
}
