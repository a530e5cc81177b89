use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::metrics::{DerivedHolding, PortfolioSummary};
use super::price::PricePoint;

/// Trailing closes for one ticker — the sparkline feed.
///
/// The core computes these; the frontend just renders. A ticker the provider
/// had no data for appears with an empty `points` vec so the UI can show an
/// explicit "sem dados" state instead of skipping the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerTrend {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

/// One slice of the sector-allocation donut chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSlice {
    /// Sector label (e.g., "Papel", "Shopping")
    pub sector: String,

    /// Current value held in this sector (priced rows only)
    pub current_value: f64,

    /// This sector's share of the priced portfolio value, 0–100
    pub allocation_pct: f64,
}

/// One group of the invested-vs-current bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonBar {
    pub ticker: String,
    pub invested: f64,
    /// `None` when the ticker had no price this cycle
    pub current_value: Option<f64>,
}

/// The full output of one refresh cycle, ready for rendering.
///
/// Pure derived data with no independent identity — recomputed every refresh
/// and discarded after rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// When this view was computed
    pub as_of: DateTime<Utc>,

    /// Per-holding derived rows, in portfolio order
    pub rows: Vec<DerivedHolding>,

    /// Aggregate totals over the priced rows
    pub summary: PortfolioSummary,

    /// Per-ticker trailing closes for sparklines
    pub trends: Vec<TickerTrend>,

    /// Current value aggregated per sector, largest first
    pub sector_allocation: Vec<SectorSlice>,

    /// Invested vs. current value per ticker
    pub comparison: Vec<ComparisonBar>,

    /// Set when the whole market-data fetch failed this cycle. The view is
    /// still rendered (all prices missing); this is a warning, not an error.
    pub fetch_error: Option<String>,
}

impl DashboardView {
    /// Export the full view as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize view: {e}")))
    }

    /// Export the derived rows as a CSV string.
    /// Columns: ticker, quantity, average_price, sector, current_price,
    /// invested, current_value, profit_loss, return_pct.
    /// Undefined values become empty cells, never 0.00.
    #[must_use]
    pub fn rows_to_csv(&self) -> String {
        let mut csv = String::from(
            "ticker,quantity,average_price,sector,current_price,invested,current_value,profit_loss,return_pct\n",
        );
        for row in &self.rows {
            let h = &row.holding;
            // Escape CSV: quote fields containing commas, quotes, or newlines
            let sector = if h.sector.contains(',') || h.sector.contains('"') || h.sector.contains('\n') {
                format!("\"{}\"", h.sector.replace('"', "\"\""))
            } else {
                h.sector.clone()
            };
            csv.push_str(&format!(
                "{},{},{:.2},{},{},{:.2},{},{},{}\n",
                h.ticker,
                h.quantity,
                h.average_price,
                sector,
                opt_cell(row.current_price),
                row.invested,
                opt_cell(row.current_value),
                opt_cell(row.profit_loss),
                opt_cell(row.return_pct),
            ));
        }
        csv
    }
}

fn opt_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => String::new(),
    }
}
