// =============================================================================
// Per-Symbol Resolver
// =============================================================================
//
// One history fetch per symbol feeds both dashboard views.  The resolver never
// fails: fetch errors produce the all-absent record pair, and every numeric
// field degrades on its own inside the Indicator Engine.
//
// Short history (< 61 closes) still gets a best-effort 1-day change from the
// live quote; everything else is left absent.
// =============================================================================

use tracing::{debug, warn};

use crate::indicators::{
    self, perf_1d, perf_nd, rsi_14, TRADING_DAYS_20, TRADING_DAYS_5, TRADING_DAYS_60,
};
use crate::sources::PriceSource;
use crate::types::{LastPricePair, PerformanceRecord, PriceHistory, SymbolData};

/// Fetch and compute both views for `symbol`.
pub async fn resolve_symbol<P>(source: &P, symbol: &str) -> SymbolData
where
    P: PriceSource + ?Sized,
{
    let history = match source.fetch_price_history(symbol).await {
        Ok(h) => h,
        Err(e) => {
            warn!(symbol, error = %e, "price history fetch failed");
            return SymbolData::unavailable();
        }
    };

    let closes: Vec<f64> = history.closes.into_iter().filter(|c| c.is_finite()).collect();

    if closes.len() < TRADING_DAYS_60 {
        debug!(symbol, closes = closes.len(), "history too short, live 1D only");
        let quote = match source.fetch_last_price_pair(symbol).await {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!(symbol, error = %e, "last price fetch failed");
                None
            }
        };
        return short_history(quote.as_ref());
    }

    compute(&PriceHistory {
        closes,
        quote: history.quote,
    })
}

/// Full computation over a history of at least `TRADING_DAYS_60` closes.
pub fn compute(history: &PriceHistory) -> SymbolData {
    let closes = history.closes.as_slice();
    let rsi = rsi_14(closes);

    let perf = PerformanceRecord {
        perf1d: perf_1d(closes, history.quote.as_ref()),
        perf5d: perf_nd(closes, TRADING_DAYS_5),
        perf20d: perf_nd(closes, TRADING_DAYS_20),
        perf60d: perf_nd(closes, TRADING_DAYS_60),
        rsi_14: rsi,
    };

    SymbolData {
        perf,
        rebound: indicators::rebound(closes, rsi),
    }
}

/// Record pair for a symbol whose history is too short: only the 1-day
/// change from a live quote, if one was obtained.
fn short_history(quote: Option<&LastPricePair>) -> SymbolData {
    let perf1d = quote.and_then(|pair| perf_1d(&[], Some(pair)));
    SymbolData {
        perf: PerformanceRecord {
            perf1d,
            ..PerformanceRecord::default()
        },
        ..SymbolData::unavailable()
    }
}
