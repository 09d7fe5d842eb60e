// =============================================================================
// Relative Strength Index (RSI): simple-average form
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes.
//
// Step 1 - Take the last `period` deltas of consecutive closes.
// Step 2 - avg_gain = mean of the positive deltas (non-positive count as 0)
//          avg_loss = mean of |negative deltas| (non-negative count as 0)
// Step 3 - RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Unlike Wilder's smoothing, only the most recent `period + 1` closes matter:
// this is the value the dashboard publishes as `rsi_14`.
// =============================================================================

use super::{round_to, RSI_PERIOD};

/// RSI over the last `period` daily changes, rounded to 2 decimals.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` closes => `None`
/// - Average loss of exactly zero => `100.0` (ceiling, no division)
/// - Non-finite inputs or results => `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    // f64::max swallows NaN, so reject it up front.
    if window.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let (sum_gain, sum_loss) = window.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let delta = w[1] - w[0];
        (g + delta.max(0.0), l + (-delta).max(0.0))
    });

    let period_f = period as f64;
    let avg_gain = sum_gain / period_f;
    let avg_loss = sum_loss / period_f;

    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    round_to(100.0 - 100.0 / (1.0 + rs), 2)
}

/// The 14-period RSI published on both dashboard tables.
pub fn rsi_14(closes: &[f64]) -> Option<f64> {
    calculate_rsi(closes, RSI_PERIOD)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(rsi_14(&[]).is_none());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(rsi_14(&closes).is_none());
    }

    #[test]
    fn rsi_monotonic_fifteen_points_is_exactly_100() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        assert_eq!(rsi_14(&closes), Some(100.0));
    }

    #[test]
    fn rsi_flat_market_hits_ceiling() {
        // No losses at all, including no gains: avg_loss == 0 => 100.
        assert_eq!(rsi_14(&[100.0; 20]), Some(100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        assert_eq!(rsi_14(&closes), Some(0.0));
    }

    #[test]
    fn rsi_uses_only_the_last_fifteen_closes() {
        // A crash far in the past must not leak into the value.
        let mut closes = vec![500.0, 1.0];
        closes.extend((1..=15).map(|x| x as f64));
        assert_eq!(rsi_14(&closes), Some(100.0));
    }

    #[test]
    fn rsi_balanced_moves() {
        // Alternating +1 / -1: 7 gains, 7 losses => RS = 1 => RSI = 50.
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 10.0 } else { 11.0 })
            .collect();
        assert_eq!(rsi_14(&closes), Some(50.0));
    }

    #[test]
    fn rsi_rounds_to_two_decimals() {
        // 13 gains of +1, one loss of -2 => RS = 13/2 => RSI = 86.666..
        let mut closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        closes.push(12.0);
        assert_eq!(rsi_14(&closes), Some(86.67));
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let v = rsi_14(&closes).unwrap();
        assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
    }

    #[test]
    fn rsi_nan_input_is_absent() {
        let mut closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        closes[10] = f64::NAN;
        assert!(rsi_14(&closes).is_none());
    }
}
