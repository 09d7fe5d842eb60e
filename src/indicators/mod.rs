// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free derivations over a single series of daily closes
// (oldest first).  Every public function returns `Option<T>` so callers are
// forced to handle insufficient-data and numerical-edge-case scenarios; a
// failure in one derivation never affects its siblings.

pub mod performance;
pub mod rebound;
pub mod rsi;

pub use performance::{perf_1d, perf_nd};
pub use rebound::rebound;
pub use rsi::rsi_14;

/// Bars needed for a 5-day return (current close + 5 sessions back).
pub const TRADING_DAYS_5: usize = 6;
/// Bars needed for a 20-day return.
pub const TRADING_DAYS_20: usize = 21;
/// Bars needed for a 60-day return. Also the minimum history the resolver
/// requires before it computes anything beyond the 1-day change.
pub const TRADING_DAYS_60: usize = 61;

/// Look-back of the RSI oscillator.
pub const RSI_PERIOD: usize = 14;

/// Window of the rebound indicator.
pub const REBOUND_DAYS: usize = 5;

/// Round `value` to `decimals` places, dropping non-finite results.
///
/// Exact halves go to the even neighbour, so 0.125 publishes as 0.12.
pub(crate) fn round_to(value: f64, decimals: i32) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round_ties_even() / factor;
    rounded.is_finite().then_some(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(1.23456, 2), Some(1.23));
        assert_eq!(round_to(-1.235001, 2), Some(-1.24));
        assert_eq!(round_to(0.123456, 4), Some(0.1235));
    }

    #[test]
    fn round_to_sends_halves_to_even() {
        assert_eq!(round_to(0.125, 2), Some(0.12));
        assert_eq!(round_to(0.375, 2), Some(0.38));
        assert_eq!(round_to(2.5, 0), Some(2.0));
        assert_eq!(round_to(-0.125, 2), Some(-0.12));
    }

    #[test]
    fn round_to_rejects_non_finite() {
        assert_eq!(round_to(f64::NAN, 2), None);
        assert_eq!(round_to(f64::INFINITY, 2), None);
    }
}
