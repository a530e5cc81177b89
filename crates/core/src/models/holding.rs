use serde::{Deserialize, Serialize};

/// A single user-declared position: one row of the editable portfolio table.
///
/// Holdings don't store live prices. Current prices are fetched per refresh
/// cycle and combined with holdings by the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// B3 ticker symbol, uppercased (e.g., "MXRF11.SA", "XPML11.SA")
    pub ticker: String,

    /// Number of units held (>= 0)
    pub quantity: f64,

    /// Average cost basis per unit (> 0)
    pub average_price: f64,

    /// Free-text sector label (e.g., "Papel", "Shopping", "Lajes")
    pub sector: String,
}

impl Holding {
    pub fn new(
        ticker: impl Into<String>,
        quantity: f64,
        average_price: f64,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            quantity,
            average_price,
            sector: sector.into(),
        }
    }
}

/// A holding row that failed validation, together with the reason.
///
/// Rejections are reported, never thrown — the store drops the row and the
/// caller decides whether to warn the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedHolding {
    /// The row as submitted
    pub holding: Holding,

    /// Human-readable rejection reason
    pub reason: String,
}

/// The five seed positions from the original SSA-Invest dashboard, so a
/// fresh portfolio doesn't start empty.
#[must_use]
pub fn sample_portfolio() -> Vec<Holding> {
    vec![
        Holding::new("MXRF11.SA", 100.0, 10.20, "Papel"),
        Holding::new("XPML11.SA", 10.0, 112.00, "Shopping"),
        Holding::new("BTHF11.SA", 50.0, 9.80, "Hedge Fund"),
        Holding::new("PVBI11.SA", 5.0, 95.00, "Lajes"),
        Holding::new("VGHF11.SA", 120.0, 9.10, "Hedge Fund"),
    ]
}
