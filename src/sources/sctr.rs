// =============================================================================
// StockCharts SCTR Client: daily Technical Rank top 300
// =============================================================================
//
// The SCTR page is backed by a JSON feed returning one object per symbol.
// Field casing varies between feed versions (`symbol` / `Symbol`), so the
// parser accepts both.  When a score column is present rows are ordered by
// descending score; otherwise the feed order is trusted.
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{RankingSource, SCTR_TOP_N};
use crate::types::RankedSymbol;

/// StockCharts SCTR ranking client.
#[derive(Debug, Clone)]
pub struct SctrClient {
    url: String,
    client: reqwest::Client,
}

impl SctrClient {
    /// Create a client for the feed at `url`.
    ///
    /// # Arguments
    /// * `url`     - SCTR JSON endpoint.
    /// * `timeout` - whole-request timeout; the feed is slow to render.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sctr-picks/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client for SctrClient");

        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl RankingSource for SctrClient {
    #[instrument(skip(self), name = "sctr::fetch_ranking")]
    async fn fetch_ranking(&self) -> Result<Vec<RankedSymbol>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("GET SCTR ranking request failed")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("failed to parse SCTR ranking response")?;

        if !status.is_success() {
            anyhow::bail!("SCTR feed returned {}: {}", status, body);
        }

        let ranking = parse_sctr_rows(&body)?;
        info!(count = ranking.len(), "SCTR ranking fetched");
        Ok(ranking)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Turn the SCTR feed payload into a ranked list.
///
/// Accepts a bare array of rows or an object wrapping it under `data` or
/// `rows`.  Rows without a symbol and repeated symbols are dropped; the
/// result is truncated to [`SCTR_TOP_N`] and ranked from 1.
pub fn parse_sctr_rows(body: &Value) -> Result<Vec<RankedSymbol>> {
    let rows = body
        .as_array()
        .or_else(|| body.get("data").and_then(Value::as_array))
        .or_else(|| body.get("rows").and_then(Value::as_array))
        .context("SCTR response does not contain a row array")?;

    let mut parsed: Vec<(String, String, Option<f64>)> = rows
        .iter()
        .filter_map(|row| {
            let symbol = text_field(row, &["symbol", "Symbol"])?;
            let name = text_field(row, &["name", "Name"]).unwrap_or_default();
            let score = number_field(row, &["sctr", "SCTR"]);
            Some((symbol, name, score))
        })
        .collect();

    if parsed.iter().any(|(_, _, score)| score.is_some()) {
        // Unscored rows sink to the bottom; sort is stable for equal scores.
        parsed.sort_by(|a, b| {
            let (sa, sb) = (a.2.unwrap_or(f64::NEG_INFINITY), b.2.unwrap_or(f64::NEG_INFINITY));
            sb.total_cmp(&sa)
        });
    }

    let mut seen = HashSet::new();
    let ranking: Vec<RankedSymbol> = parsed
        .into_iter()
        .filter(|(symbol, _, _)| seen.insert(symbol.clone()))
        .take(SCTR_TOP_N)
        .zip(1_u32..)
        .map(|((symbol, name, _), rank)| RankedSymbol::new(rank, symbol, name))
        .collect();

    if ranking.is_empty() {
        anyhow::bail!("SCTR response contained no symbols");
    }

    debug!(rows = rows.len(), ranked = ranking.len(), "SCTR rows parsed");
    Ok(ranking)
}

/// First non-empty string under any of `keys`, trimmed.
fn text_field(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| row.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Finite numeric value under any of `keys`; accepts numbers and numeric
/// strings.
fn number_field(row: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        let value = match row.get(*k)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_array_in_feed_order() {
        let body = json!([
            { "symbol": "NVDA", "name": "NVIDIA Corp" },
            { "symbol": "PLTR", "name": "Palantir" },
        ]);
        let ranking = parse_sctr_rows(&body).unwrap();
        assert_eq!(
            ranking,
            vec![
                RankedSymbol::new(1, "NVDA", "NVIDIA Corp"),
                RankedSymbol::new(2, "PLTR", "Palantir"),
            ]
        );
    }

    #[test]
    fn accepts_capitalised_fields_and_wrapped_rows() {
        let body = json!({ "data": [ { "Symbol": "AVGO", "Name": "Broadcom" } ] });
        let ranking = parse_sctr_rows(&body).unwrap();
        assert_eq!(ranking[0].symbol, "AVGO");
        assert_eq!(ranking[0].name, "Broadcom");
    }

    #[test]
    fn orders_by_descending_score() {
        let body = json!([
            { "symbol": "LOW", "sctr": 12.5 },
            { "symbol": "HIGH", "sctr": "99.1" },
            { "symbol": "MID", "sctr": 50 },
            { "symbol": "NONE" },
        ]);
        let symbols: Vec<String> = parse_sctr_rows(&body)
            .unwrap()
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, vec!["HIGH", "MID", "LOW", "NONE"]);
    }

    #[test]
    fn non_finite_scores_count_as_unscored() {
        let body = json!([
            { "symbol": "LOW", "sctr": 12.5 },
            { "symbol": "JUNK", "sctr": "NaN" },
            { "symbol": "HUGE", "SCTR": "inf" },
            { "symbol": "HIGH", "sctr": 99.1 },
        ]);
        let symbols: Vec<String> = parse_sctr_rows(&body)
            .unwrap()
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, vec!["HIGH", "LOW", "JUNK", "HUGE"]);
    }

    #[test]
    fn drops_blank_and_duplicate_symbols() {
        let body = json!([
            { "symbol": "AAA" },
            { "symbol": "  " },
            { "name": "no symbol" },
            { "symbol": "AAA", "name": "again" },
            { "symbol": "BBB" },
        ]);
        let ranking = parse_sctr_rows(&body).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[1], RankedSymbol::new(2, "BBB", ""));
    }

    #[test]
    fn truncates_to_universe_size() {
        let rows: Vec<Value> = (0..350).map(|i| json!({ "symbol": format!("S{i}") })).collect();
        let ranking = parse_sctr_rows(&Value::Array(rows)).unwrap();
        assert_eq!(ranking.len(), SCTR_TOP_N);
        assert_eq!(ranking.last().unwrap().rank, 300);
    }

    #[test]
    fn empty_or_malformed_is_an_error() {
        assert!(parse_sctr_rows(&json!([])).is_err());
        assert!(parse_sctr_rows(&json!({ "error": "blocked" })).is_err());
    }
}
