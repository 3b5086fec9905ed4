//! Yahoo Finance daily-close provider.
//!
//! API: `{base}/v8/finance/chart/{symbol}?period1=…&period2=…&interval=1d`
//! Auth: none. A browser-like User-Agent is required or the endpoint
//! answers 429.
//!
//! FX symbols use the `=X` suffix (`CADJPY=X`). Bars are stamped at the
//! exchange's midnight, so timestamps are shifted by the response's
//! `gmtoffset` before taking the calendar date. Days Yahoo cannot price
//! come back as `null` closes and are kept as missing points.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::PriceSource;
use crate::config::DataSourceConfig;
use crate::types::{DateWindow, PricePoint, PriceSeries};

const PROVIDER_NAME: &str = "yahoo-finance";

// ---------------------------------------------------------------------------
// API response types (chart JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    /// Bar open times, seconds since epoch. Absent when the window is empty.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
    #[serde(default)]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance chart-API client.
pub struct YahooFinanceClient {
    http: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(config: &DataSourceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for Yahoo Finance")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, window: &DateWindow) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includePrePost=false",
            self.base_url,
            urlencoding::encode(symbol),
            window.start.timestamp(),
            window.end.timestamp(),
        )
    }

    /// Bar timestamp → exchange-local calendar date.
    fn bar_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
    }

    /// Convert a decoded chart response into a `PriceSeries`.
    fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<PriceSeries> {
        if let Some(err) = envelope.chart.error {
            anyhow::bail!("Yahoo chart error {}: {}", err.code, err.description);
        }

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .context("Empty chart response")?;

        if result.timestamp.is_empty() {
            anyhow::bail!("No observations returned for {symbol}");
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .context("Malformed chart response: missing quote block")?;

        if quote.close.len() != result.timestamp.len() {
            anyhow::bail!(
                "Malformed chart response: {} timestamps but {} closes",
                result.timestamp.len(),
                quote.close.len()
            );
        }

        let gmtoffset = result.meta.gmtoffset;
        let points = result
            .timestamp
            .iter()
            .zip(quote.close)
            .map(|(ts, close)| {
                Self::bar_date(*ts, gmtoffset)
                    .map(|date| PricePoint { date, close })
                    .with_context(|| format!("Timestamp out of range: {ts}"))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            symbol,
            reported_symbol = %result.meta.symbol,
            currency = ?result.meta.currency,
            timezone = ?result.meta.exchange_timezone_name,
            points = points.len(),
            "Parsed Yahoo chart"
        );

        Ok(PriceSeries::new(symbol, points))
    }
}

// ---------------------------------------------------------------------------
// PriceSource trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PriceSource for YahooFinanceClient {
    async fn fetch_daily_closes(&self, symbol: &str, window: DateWindow) -> Result<PriceSeries> {
        let url = self.chart_url(symbol, &window);
        debug!(url = %url, "Fetching Yahoo chart");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Yahoo request failed for {symbol}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read Yahoo response for {symbol}"))?;

        if !status.is_success() {
            // Error responses still carry the chart envelope when Yahoo knows why.
            if let Ok(envelope) = serde_json::from_str::<ChartEnvelope>(&body) {
                if let Some(err) = envelope.chart.error {
                    anyhow::bail!("Yahoo API error {status} ({}): {}", err.code, err.description);
                }
            }
            anyhow::bail!("Yahoo API error {status}");
        }

        let envelope: ChartEnvelope = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Yahoo chart response for {symbol}"))?;

        let series = Self::parse_chart(symbol, envelope)?;
        info!(
            symbol,
            points = series.len(),
            valid = series.valid_count(),
            "Downloaded daily closes"
        );
        Ok(series)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
