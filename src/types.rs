// =============================================================================
// Shared types used across the SCTR Picks service
// =============================================================================
//
// Every numeric field is an `Option<f64>`: `None` means "could not be derived"
// and serialises to JSON `null`, which the dashboard renders differently from
// a genuine zero.
// =============================================================================

use serde::{Deserialize, Serialize};

// =============================================================================
// Ranking
// =============================================================================

/// One entry of the daily SCTR ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSymbol {
    /// 1-based position in the ranking, unique within a snapshot.
    pub rank: u32,
    pub symbol: String,
    /// Company name as published; may be empty.
    #[serde(default)]
    pub name: String,
}

impl RankedSymbol {
    pub fn new(rank: u32, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            rank,
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Price data
// =============================================================================

/// Previous close and last traded price, used for the same-day change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LastPricePair {
    pub previous_close: Option<f64>,
    pub last_price: Option<f64>,
}

/// Daily closes for one symbol (oldest first) plus an optional live quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    pub closes: Vec<f64>,
    pub quote: Option<LastPricePair>,
}

#[cfg(test)]
impl PriceHistory {
    pub fn from_closes(closes: Vec<f64>) -> Self {
        Self {
            closes,
            quote: None,
        }
    }
}

// =============================================================================
// Indicator records
// =============================================================================

/// Short-horizon performance of a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub perf1d: Option<f64>,
    pub perf5d: Option<f64>,
    pub perf20d: Option<f64>,
    pub perf60d: Option<f64>,
    pub rsi_14: Option<f64>,
}

/// Coarse trajectory of the last five closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveShape {
    VShape,
    AShape,
    WayUp,
    WayDown,
}

impl std::fmt::Display for CurveShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VShape => write!(f, "v_shape"),
            Self::AShape => write!(f, "a_shape"),
            Self::WayUp => write!(f, "way_up"),
            Self::WayDown => write!(f, "way_down"),
        }
    }
}

/// Rebound view over the last five closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReboundRecord {
    /// Rebound index: product of both gains over the 5-day low, scaled by 1e6.
    pub ri: Option<f64>,
    /// Gain of the first close of the window over the low, per mille.
    pub p1_pl: Option<f64>,
    /// Gain of the last close of the window over the low, per mille.
    pub p5_pl: Option<f64>,
    pub d5_d1_gain_ratio: Option<f64>,
    pub rsi_14: Option<f64>,
    pub curve_shape: Option<CurveShape>,
}

/// Both views for one symbol, produced from a single history fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SymbolData {
    pub perf: PerformanceRecord,
    pub rebound: ReboundRecord,
}

impl SymbolData {
    /// The all-absent pair reported when a symbol cannot be resolved.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Benchmark performance. Carries the four return fields only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub perf1d: Option<f64>,
    pub perf5d: Option<f64>,
    pub perf20d: Option<f64>,
    pub perf60d: Option<f64>,
}

impl From<&PerformanceRecord> for BenchmarkRecord {
    fn from(perf: &PerformanceRecord) -> Self {
        Self {
            perf1d: perf.perf1d,
            perf5d: perf.perf5d,
            perf20d: perf.perf20d,
            perf60d: perf.perf60d,
        }
    }
}

// =============================================================================
// Dashboard snapshot
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    #[serde(flatten)]
    pub ranked: RankedSymbol,
    #[serde(flatten)]
    pub perf: PerformanceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReboundRow {
    #[serde(flatten)]
    pub ranked: RankedSymbol,
    #[serde(flatten)]
    pub rebound: ReboundRecord,
}

/// Aggregated response: both tables in ascending rank order plus the
/// benchmark row. Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    #[serde(rename = "perf")]
    pub performance: Vec<PerformanceRow>,
    pub rebound: Vec<ReboundRow>,
    #[serde(rename = "qqq")]
    pub benchmark: BenchmarkRecord,
}
