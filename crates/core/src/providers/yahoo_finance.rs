use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::price::{PriceHistory, PriceSeries};
use super::traits::QuoteProvider;

/// Yahoo Finance provider for B3 quotes.
///
/// - **Free**: No API key required (unofficial public API).
/// - **Coverage**: B3 listings under the ".SA" suffix (e.g., "MXRF11.SA").
/// - **Fallback role**: registered after brapi; per-ticker requests, so it is
///   chattier than the batched primary.
///
/// Uses the `yahoo_finance_api` crate, which speaks `time::OffsetDateTime` —
/// converted from `chrono` at this boundary only.
///
/// **Note**: Not WASM-compatible (native reqwest/tokio connectors).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    /// "MXRF11" → "MXRF11.SA" (Yahoo qualifies B3 listings with .SA).
    fn to_yahoo_symbol(ticker: &str) -> String {
        let upper = ticker.to_uppercase();
        if upper.ends_with(".SA") {
            upper
        } else {
            format!("{upper}.SA")
        }
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month: time::Month = match date.month() {
            1 => time::Month::January,
            2 => time::Month::February,
            3 => time::Month::March,
            4 => time::Month::April,
            5 => time::Month::May,
            6 => time::Month::June,
            7 => time::Month::July,
            8 => time::Month::August,
            9 => time::Month::September,
            10 => time::Month::October,
            11 => time::Month::November,
            12 => time::Month::December,
            _ => unreachable!(),
        };

        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Invalid date {date}: {e}"),
            })?
            .with_hms(0, 0, 0)
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Invalid time for {date}: {e}"),
            })?
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    async fn fetch_one(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, CoreError> {
        let symbol = Self::to_yahoo_symbol(ticker);
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + chrono::Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(&symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let mut series = PriceSeries::new();
        for quote in &quotes {
            let Some(date) = Self::timestamp_to_naive_date(quote.timestamp) else {
                continue;
            };
            if date >= from && date <= to && quote.close.is_finite() && quote.close > 0.0 {
                series.insert(date, quote.close);
            }
        }
        Ok(series)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_history(
        &self,
        tickers: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceHistory, CoreError> {
        let mut history = PriceHistory::new();
        let mut last_error = None;

        for ticker in tickers {
            match self.fetch_one(ticker, from, to).await {
                Ok(series) if !series.is_empty() => {
                    history.insert(ticker.clone(), series);
                }
                Ok(_) => {} // no data for this ticker — best-effort, skip
                Err(e) => {
                    last_error = Some(e);
                    // Keep going: one bad ticker must not sink the batch
                }
            }
        }

        // Only a total failure is an error; partial data is a success.
        if history.is_empty() && !tickers.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(history)
    }
}
