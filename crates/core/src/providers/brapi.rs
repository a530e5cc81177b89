use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::{PriceHistory, PriceSeries};
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://brapi.dev/api";

/// brapi.dev provider for B3-listed quotes (FIIs, stocks, ETFs).
///
/// - **B3-native**: tickers without a suffix ("MXRF11"), while this library
///   uses the exchange-qualified ".SA" form. The suffix is stripped for the
///   request and results are keyed back by the caller's tickers.
/// - **Batched**: one `GET /quote/{T1,T2,...}` call covers the whole portfolio.
/// - **Token**: optional bearer token raises rate limits; works without one.
/// - **Best-effort**: unknown tickers are simply absent from `results`.
pub struct BrapiProvider {
    client: Client,
    token: Option<String>,
}

impl BrapiProvider {
    pub fn new(token: Option<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            token,
        }
    }

    /// "MXRF11.SA" → "MXRF11" (brapi speaks bare B3 symbols).
    fn to_b3_symbol(ticker: &str) -> String {
        ticker
            .strip_suffix(".SA")
            .unwrap_or(ticker)
            .to_uppercase()
    }

    /// Smallest brapi range parameter covering `days` calendar days.
    fn range_param(days: i64) -> &'static str {
        match days {
            d if d <= 5 => "5d",
            d if d <= 30 => "1mo",
            d if d <= 90 => "3mo",
            _ => "1y",
        }
    }
}

impl Default for BrapiProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── brapi API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    results: Vec<QuoteResult>,
}

#[derive(Deserialize)]
struct QuoteResult {
    symbol: String,
    #[serde(rename = "historicalDataPrice", default)]
    historical: Vec<HistoricalPoint>,
}

#[derive(Deserialize)]
struct HistoricalPoint {
    /// Unix timestamp (seconds)
    date: i64,
    close: Option<f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for BrapiProvider {
    fn name(&self) -> &str {
        "brapi"
    }

    async fn fetch_history(
        &self,
        tickers: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceHistory, CoreError> {
        if tickers.is_empty() {
            return Ok(PriceHistory::new());
        }

        let symbols: Vec<String> = tickers.iter().map(|t| Self::to_b3_symbol(t)).collect();
        let range = Self::range_param((to - from).num_days());
        let url = format!(
            "{BASE_URL}/quote/{}?range={range}&interval=1d",
            symbols.join(",")
        );

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "brapi".into(),
                message: format!("HTTP {} for quote batch", resp.status()),
            });
        }

        let body: QuoteResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "brapi".into(),
            message: format!("Failed to parse quote response: {e}"),
        })?;

        let mut history = PriceHistory::new();
        for result in body.results {
            // Map the bare B3 symbol back to the caller's ticker string
            let Some(ticker) = tickers
                .iter()
                .find(|t| Self::to_b3_symbol(t) == result.symbol.to_uppercase())
            else {
                continue;
            };

            let mut series = PriceSeries::new();
            for point in result.historical {
                let Some(date) =
                    chrono::DateTime::from_timestamp(point.date, 0).map(|dt| dt.date_naive())
                else {
                    continue;
                };
                if date < from || date > to {
                    continue;
                }
                // Drop non-finite / non-positive closes rather than poisoning metrics
                match point.close {
                    Some(close) if close.is_finite() && close > 0.0 => {
                        series.insert(date, close);
                    }
                    _ => {}
                }
            }

            if !series.is_empty() {
                history.insert(ticker.clone(), series);
            }
        }

        Ok(history)
    }
}
