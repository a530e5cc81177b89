use std::collections::HashMap;

use crate::models::chart::{ComparisonBar, SectorSlice, TickerTrend};
use crate::models::holding::Holding;
use crate::models::metrics::DerivedHolding;
use crate::models::price::PriceHistory;

/// Generates chart-ready data sets from derived rows and fetched history.
///
/// The core computes all the numbers — the frontend only renders:
/// - per-ticker trailing closes (sparklines)
/// - current value by sector (donut)
/// - invested vs. current value per ticker (grouped bars)
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Trailing close points per held ticker, in portfolio order.
    /// Tickers the provider had no data for get an empty points vec.
    #[must_use]
    pub fn ticker_trends(&self, holdings: &[Holding], history: &PriceHistory) -> Vec<TickerTrend> {
        holdings
            .iter()
            .map(|h| TickerTrend {
                ticker: h.ticker.clone(),
                points: history
                    .get(&h.ticker)
                    .map(|series| series.trend().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Current value aggregated per sector, largest first.
    /// Only priced rows contribute; percentages are over the priced total.
    /// Empty when nothing is priced (no slice is ever 0/0).
    #[must_use]
    pub fn sector_allocation(&self, rows: &[DerivedHolding]) -> Vec<SectorSlice> {
        let mut by_sector: HashMap<String, f64> = HashMap::new();
        let mut total = 0.0;

        for row in rows {
            if let Some(value) = row.current_value {
                *by_sector.entry(row.holding.sector.clone()).or_insert(0.0) += value;
                total += value;
            }
        }

        if total <= 0.0 {
            return Vec::new();
        }

        let mut slices: Vec<SectorSlice> = by_sector
            .into_iter()
            .map(|(sector, current_value)| SectorSlice {
                sector,
                current_value,
                allocation_pct: (current_value / total) * 100.0,
            })
            .collect();

        // Largest first; ties broken by sector name for determinism
        slices.sort_by(|a, b| {
            b.current_value
                .partial_cmp(&a.current_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sector.cmp(&b.sector))
        });
        slices
    }

    /// Invested vs. current value per ticker, in row order.
    #[must_use]
    pub fn invested_vs_current(&self, rows: &[DerivedHolding]) -> Vec<ComparisonBar> {
        rows.iter()
            .map(|row| ComparisonBar {
                ticker: row.holding.ticker.clone(),
                invested: row.invested,
                current_value: row.current_value,
            })
            .collect()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
