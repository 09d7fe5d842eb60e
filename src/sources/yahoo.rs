// =============================================================================
// Yahoo Finance Client: daily closes via the v8 chart endpoint
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={range}&interval=1d
//
// Share-class tickers are sent in Yahoo's dashed form (BRK/B => BRK-B).
//
// Response layout (abridged):
//   chart.result[0].meta.regularMarketPrice          last traded price
//   chart.result[0].meta.previousClose               prior session close
//   chart.result[0].meta.chartPreviousClose          close before the range
//   chart.result[0].indicators.quote[0].close[]      daily closes, may hold null
//   chart.error                                      set when the symbol fails
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::PriceSource;
use crate::types::{LastPricePair, PriceHistory};

/// Yahoo Finance chart client.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    history_range: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url`      - e.g. "https://query1.finance.yahoo.com"
    /// * `history_range` - chart range for history requests, e.g. "4mo"
    /// * `timeout`       - per-request timeout; expiry is a per-symbol failure
    pub fn new(base_url: impl Into<String>, history_range: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sctr-picks/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client for YahooClient");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history_range: history_range.into(),
            client,
        }
    }

    /// GET the chart payload for `symbol` over `range`.
    async fn get_chart(&self, symbol: &str, range: &str) -> Result<Value> {
        let url = chart_url(&self.base_url, symbol, range)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol}"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("chart API returned {} for {}: {}", status, symbol, body);
        }
        Ok(body)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_price_history")]
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        let body = self.get_chart(symbol, &self.history_range).await?;
        let history = parse_chart_response(&body)?;
        debug!(symbol, closes = history.closes.len(), "price history fetched");
        Ok(history)
    }

    #[instrument(skip(self), name = "yahoo::fetch_last_price_pair")]
    async fn fetch_last_price_pair(&self, symbol: &str) -> Result<LastPricePair> {
        let body = self.get_chart(symbol, "1d").await?;
        let meta = chart_result(&body)?
            .get("meta")
            .context("chart result missing 'meta'")?;

        let pair = LastPricePair {
            previous_close: meta_price(meta, "previousClose")
                .or_else(|| meta_price(meta, "chartPreviousClose")),
            last_price: meta_price(meta, "regularMarketPrice"),
        };
        debug!(symbol, ?pair, "last price pair fetched");
        Ok(pair)
    }
}

// =============================================================================
// Request building
// =============================================================================

/// Yahoo spells share classes with a dash: `BRK/B` and `BRK.B` become `BRK-B`.
pub fn yahoo_symbol(symbol: &str) -> String {
    symbol.trim().replace(['/', '.'], "-")
}

/// `{base}/v8/finance/chart/{symbol}?range={range}&interval=1d`, with the
/// symbol encoded as a single path segment.
fn chart_url(base_url: &str, symbol: &str, range: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url)
        .with_context(|| format!("invalid price base URL {base_url}"))?;
    let ticker = yahoo_symbol(symbol);

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("price base URL cannot carry a path: {base_url}"))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart"])
        .push(&ticker);
    url.query_pairs_mut()
        .append_pair("range", range)
        .append_pair("interval", "1d");
    Ok(url)
}

// =============================================================================
// Parsing
// =============================================================================

/// Extract daily closes (nulls dropped) and, when the meta block carries a
/// previous close, the inline quote pair.
pub fn parse_chart_response(body: &Value) -> Result<PriceHistory> {
    let result = chart_result(body)?;

    let closes: Vec<f64> = result
        .pointer("/indicators/quote/0/close")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().filter_map(Value::as_f64).filter(|c| c.is_finite()).collect())
        .unwrap_or_default();

    let quote = result.get("meta").and_then(|meta| {
        let previous_close = meta_price(meta, "previousClose")?;
        Some(LastPricePair {
            previous_close: Some(previous_close),
            last_price: meta_price(meta, "regularMarketPrice"),
        })
    });

    Ok(PriceHistory { closes, quote })
}

/// `chart.result[0]`, or the error Yahoo reported instead.
fn chart_result(body: &Value) -> Result<&Value> {
    let chart = body.get("chart").context("response missing 'chart'")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        anyhow::bail!("chart API error: {description}");
    }

    chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .context("chart response has no result")
}

fn meta_price(meta: &Value, key: &str) -> Option<f64> {
    meta.get(key).and_then(Value::as_f64).filter(|p| p.is_finite())
}
