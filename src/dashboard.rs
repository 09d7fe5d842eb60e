// =============================================================================
// Dashboard Aggregator
// =============================================================================
//
// Per request:
//   1. Acquire ranking   - one call; failure aborts with stage "scrape".
//   2. Dispatch          - one resolver per ranked symbol, plus the benchmark
//                          unless it is already ranked.
//   3. Collect           - completions in any order, keyed by rank.
//   4. Reorder/assemble  - ascending rank, benchmark split out.
//
// Nothing is cached between requests.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::parallel::map_ordered;
use crate::resolver::resolve_symbol;
use crate::sources::{PriceSource, RankingSource};
use crate::types::{
    BenchmarkRecord, DashboardSnapshot, PerformanceRow, RankedSymbol, ReboundRow, SymbolData,
};

/// Reference instrument resolved alongside the ranking.
pub const BENCHMARK_SYMBOL: &str = "QQQ";

/// Maximum number of symbols resolved concurrently.
pub const DASHBOARD_WORKERS: usize = 16;

// =============================================================================
// Errors
// =============================================================================

/// Failures surfaced to callers of the aggregator.
///
/// Everything after the ranking step is recovered locally, so the only
/// failure is the scrape stage.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("ranking acquisition failed: {0:#}")]
    Scrape(anyhow::Error),
}

impl DashboardError {
    /// Pipeline stage that failed, reported to HTTP clients.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Scrape(_) => "scrape",
        }
    }
}

// =============================================================================
// Dispatch keys
// =============================================================================

/// Identifies a resolver task. Ranked tasks sort by rank, the benchmark last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TaskKey {
    Ranked(u32),
    Benchmark,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregates a ranking and per-symbol indicators into one snapshot.
pub struct Dashboard {
    ranking: Arc<dyn RankingSource>,
    prices: Arc<dyn PriceSource>,
}

impl Dashboard {
    pub fn new(ranking: Arc<dyn RankingSource>, prices: Arc<dyn PriceSource>) -> Self {
        Self { ranking, prices }
    }

    /// Acquire the ranking only, without any per-symbol work.
    #[instrument(skip(self), name = "dashboard::ranking_preview")]
    pub async fn ranking_preview(&self) -> Result<Vec<RankedSymbol>, DashboardError> {
        self.ranking.fetch_ranking().await.map_err(|e| {
            warn!(error = %e, "ranking acquisition failed");
            DashboardError::Scrape(e)
        })
    }

    /// Build the full snapshot.
    ///
    /// Returns an error only when the ranking cannot be acquired; individual
    /// symbol failures show up as rows with every field absent.
    #[instrument(skip(self), name = "dashboard::build_snapshot")]
    pub async fn build_snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let started = Instant::now();
        let ranking = self.ranking_preview().await?;

        let ranked: Vec<RankedSymbol> = ranking
            .into_iter()
            .filter(|r| !r.symbol.is_empty())
            .collect();

        let benchmark_ranked = ranked.iter().any(|r| r.symbol == BENCHMARK_SYMBOL);

        let mut jobs: Vec<(TaskKey, String)> = ranked
            .iter()
            .map(|r| (TaskKey::Ranked(r.rank), r.symbol.clone()))
            .collect();
        if !benchmark_ranked {
            jobs.push((TaskKey::Benchmark, BENCHMARK_SYMBOL.to_string()));
        }
        let dispatched = jobs.len();

        let prices = self.prices.clone();
        let results = map_ordered(
            jobs,
            DASHBOARD_WORKERS,
            move |symbol: String| {
                let prices = prices.clone();
                async move { resolve_symbol(prices.as_ref(), &symbol).await }
            },
            |_| SymbolData::unavailable(),
        )
        .await;

        let snapshot = assemble(&ranked, results);

        info!(
            ranked = ranked.len(),
            dispatched,
            benchmark_ranked,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard snapshot built"
        );
        Ok(snapshot)
    }
}

/// Merge key-ordered resolver results back onto the ranking.
///
/// `results` must be sorted by key (as [`map_ordered`] returns them). A ranked
/// symbol with no result gets the all-absent record.
fn assemble(ranked: &[RankedSymbol], results: Vec<(TaskKey, SymbolData)>) -> DashboardSnapshot {
    let mut benchmark: Option<BenchmarkRecord> = None;
    let mut by_rank = std::collections::HashMap::with_capacity(results.len());

    for (key, data) in results {
        match key {
            TaskKey::Ranked(rank) => {
                by_rank.insert(rank, data);
            }
            TaskKey::Benchmark => benchmark = Some(BenchmarkRecord::from(&data.perf)),
        }
    }

    let mut ordered: Vec<&RankedSymbol> = ranked.iter().collect();
    ordered.sort_by_key(|r| r.rank);

    let mut performance = Vec::with_capacity(ordered.len());
    let mut rebound = Vec::with_capacity(ordered.len());
    for r in ordered {
        let data = by_rank.get(&r.rank).copied().unwrap_or_default();
        performance.push(PerformanceRow {
            ranked: r.clone(),
            perf: data.perf,
        });
        rebound.push(ReboundRow {
            ranked: r.clone(),
            rebound: data.rebound,
        });
    }

    // Benchmark already ranked: reuse its row instead of a second fetch.
    let benchmark = benchmark
        .or_else(|| {
            performance
                .iter()
                .find(|row| row.ranked.symbol == BENCHMARK_SYMBOL)
                .map(|row| BenchmarkRecord::from(&row.perf))
        })
        .unwrap_or_default();

    DashboardSnapshot {
        performance,
        rebound,
        benchmark,
    }
}
