use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;

use crate::error::AgentError;
use crate::market::types::{DailyQuotes, DailySeries};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API client. Daily bars, adjusted close preferred.
pub struct YahooClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

impl YahooClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Fetch daily history for one symbol over a Yahoo range string
    /// ("1y", "2y", "5y", ...). Any failure is fatal for the run.
    pub fn fetch_daily(&self, symbol: &str, period: &str) -> Result<DailyQuotes> {
        let url = format!("{}/{}", self.base_url, symbol);

        tracing::debug!(symbol, period, "fetching daily history");

        let response: ChartResponse = self
            .http
            .get(&url)
            .query(&[("range", period), ("interval", "1d")])
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .context("chart request failed")?
            .error_for_status()
            .context("chart request returned error status")?
            .json()
            .context("chart response JSON parse failed")?;

        Self::into_quotes(symbol, response)
    }

    fn into_quotes(symbol: &str, response: ChartResponse) -> Result<DailyQuotes> {
        if let Some(err) = response.chart.error {
            return Err(AgentError::DataFetch(format!(
                "{} ({}): {}",
                symbol, err.code, err.description
            ))
            .into());
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| AgentError::DataFetch(format!("{symbol}: empty chart result")))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| AgentError::DataFetch(format!("{symbol}: no timestamps")))?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::DataFetch(format!("{symbol}: no quote block")))?;
        let adjclose = result.indicators.adjclose.and_then(|a| a.into_iter().next());

        let mut closes = Vec::with_capacity(timestamps.len());
        let mut volumes = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            // Prefer the adjusted close; fall back to the raw close when the
            // adjclose block is absent or null for this bar.
            let close = adjclose
                .as_ref()
                .and_then(|a| a.adjclose.get(i).copied().flatten())
                .or_else(|| quote.close.get(i).copied().flatten());
            let Some(close) = close else { continue };
            if close <= 0.0 {
                continue;
            }
            // Intraday refreshes can repeat the final bar's date; keep the first.
            if closes.last().is_some_and(|(d, _)| *d >= date) {
                continue;
            }
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0) as f64;
            closes.push((date, close));
            volumes.push((date, volume));
        }

        if closes.is_empty() {
            return Err(AgentError::DataFetch(format!("{symbol}: no usable bars")).into());
        }

        tracing::debug!(symbol, bars = closes.len(), "daily history fetched");

        Ok(DailyQuotes {
            symbol: symbol.to_string(),
            close: DailySeries::from_points(closes)?,
            volume: DailySeries::from_points(volumes)?,
        })
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}
