// =============================================================================
// Data Sources
// =============================================================================
//
// Two external collaborators feed the dashboard:
//
//   1. Ranking source - the daily SCTR top-300 list (StockCharts)
//   2. Price source   - daily closes and a live quote per symbol (Yahoo)
//
// The aggregator only sees the traits below, so tests substitute in-memory
// fakes and the binary wires in the HTTP clients.

pub mod sctr;
pub mod yahoo;

pub use sctr::SctrClient;
pub use yahoo::YahooClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{LastPricePair, PriceHistory, RankedSymbol};

/// Size of the ranked universe.
pub const SCTR_TOP_N: usize = 300;

/// Produces the daily ranking.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Ranked symbols, deduplicated, ascending by rank, at most
    /// [`SCTR_TOP_N`] entries. Any error aborts the whole dashboard request.
    async fn fetch_ranking(&self) -> Result<Vec<RankedSymbol>>;
}

/// Produces price data for a single symbol.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily closes, oldest first. No guarantee on length.
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory>;

    /// Previous close and last price, used when history is too short.
    async fn fetch_last_price_pair(&self, symbol: &str) -> Result<LastPricePair>;
}
