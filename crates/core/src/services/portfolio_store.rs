use std::collections::HashSet;

use crate::models::holding::{Holding, RejectedHolding};

/// Holds and validates the user-editable holdings table.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
///
/// Validation never fails outright: malformed rows are dropped and reported
/// back with reasons so the caller can warn the user and keep rendering.
#[derive(Debug, Clone, Default)]
pub struct PortfolioStore {
    holdings: Vec<Holding>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the holdings table with `rows`.
    ///
    /// Rules per row:
    /// - ticker non-empty after trimming (accepted tickers are uppercased)
    /// - quantity finite and >= 0
    /// - average_price finite and > 0
    /// - ticker not already accepted (first occurrence wins)
    ///
    /// Returns the rejected rows with reasons. Total for any input shape —
    /// NaN, negatives, and empty strings are rejections, never panics.
    pub fn set_holdings(&mut self, rows: Vec<Holding>) -> Vec<RejectedHolding> {
        let mut accepted: Vec<Holding> = Vec::with_capacity(rows.len());
        let mut rejected: Vec<RejectedHolding> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for row in rows {
            let ticker = row.ticker.trim().to_uppercase();

            if ticker.is_empty() {
                rejected.push(RejectedHolding {
                    holding: row,
                    reason: "Ticker must not be empty".into(),
                });
                continue;
            }
            if !row.quantity.is_finite() || row.quantity < 0.0 {
                rejected.push(RejectedHolding {
                    reason: format!(
                        "Quantity for {ticker} must be a non-negative number, got {}",
                        row.quantity
                    ),
                    holding: row,
                });
                continue;
            }
            if !row.average_price.is_finite() || row.average_price <= 0.0 {
                rejected.push(RejectedHolding {
                    reason: format!(
                        "Average price for {ticker} must be positive, got {}",
                        row.average_price
                    ),
                    holding: row,
                });
                continue;
            }
            if !seen.insert(ticker.clone()) {
                rejected.push(RejectedHolding {
                    holding: row,
                    reason: format!("Duplicate ticker {ticker} — first occurrence kept"),
                });
                continue;
            }

            accepted.push(Holding { ticker, ..row });
        }

        self.holdings = accepted;
        rejected
    }

    /// The normalized holdings table, in insertion order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Unique ticker symbols in insertion order — the price-lookup key set.
    #[must_use]
    pub fn get_tickers(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.ticker.clone()).collect()
    }

    /// True when no valid holdings remain. Callers should render an
    /// "add holdings" empty state, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
