// =============================================================================
// Price Performance: percentage change over fixed session offsets
// =============================================================================
//
//   change = (current - past) / past * 100, rounded to 2 decimals
//
// An N-day change needs N + 1 closes: the current one and the close N sessions
// earlier.  Missing or zero reference prices yield `None`, never a panic.

use super::round_to;
use crate::types::LastPricePair;

/// Percentage change from `past` to `current`, rounded to 2 decimals.
///
/// Returns `None` when `past` is absent or exactly zero.
pub fn percent_change(current: f64, past: Option<f64>) -> Option<f64> {
    let past = past?;
    if past == 0.0 {
        return None;
    }
    round_to((current - past) / past * 100.0, 2)
}

/// Change between the last close and the close `required_len - 1` sessions
/// before it. `None` unless the series holds at least `required_len` closes.
pub fn perf_nd(closes: &[f64], required_len: usize) -> Option<f64> {
    if required_len < 2 || closes.len() < required_len {
        return None;
    }
    let last = *closes.last()?;
    percent_change(last, closes.get(closes.len() - required_len).copied())
}

/// Same-day change.
///
/// A quote pair wins when it carries a previous close; its last price falls
/// back to the newest close of the series. Without a usable quote the two most
/// recent closes are used.
pub fn perf_1d(closes: &[f64], quote: Option<&LastPricePair>) -> Option<f64> {
    if let Some(pair) = quote {
        if let Some(prev) = pair.previous_close {
            let current = pair.last_price.or_else(|| closes.last().copied())?;
            return percent_change(current, Some(prev));
        }
    }
    perf_nd(closes, 2)
}
