// =============================================================================
// Rebound Indicator: how hard a symbol bounced off its 5-day low
// =============================================================================
//
// Over the last five closes [c0..c4] with low `pl`:
//
//   g1 = (c0 - pl) / pl          g5 = (c4 - pl) / pl
//   ri     = g1 * g5 * 1_000_000
//   p1_pl  = g1 * 1000           p5_pl = g5 * 1000
//   d5_d1  = (c4 - c0) / c0
//
// `ri` is large only when both the start and the end of the window sit well
// above the low, i.e. the low is interior and price has recovered from it.
//
// Curve shape is decided from the positions of the window's min and max, in
// this order:
//   1. min at index 1..=3          => v_shape
//   2. max at index 1..=3          => a_shape
//   3. min at 0 and max at 4       => way_up
//   4. max at 0 and min at 4       => way_down
//   5. otherwise                   => way_up if c4 >= c0, else way_down
// Both min and max resolve ties to the FIRST occurrence.
// =============================================================================

use super::{round_to, REBOUND_DAYS};
use crate::types::{CurveShape, ReboundRecord};

/// Classify a 5-close window. `None` when the window is not exactly
/// `REBOUND_DAYS` long or contains a non-finite close.
pub fn classify_curve(window: &[f64]) -> Option<CurveShape> {
    if window.len() != REBOUND_DAYS || window.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let idx_min = first_index_by(window, |candidate, best| candidate < best);
    let idx_max = first_index_by(window, |candidate, best| candidate > best);
    let last = REBOUND_DAYS - 1;
    let interior = 1..last;

    let shape = if interior.contains(&idx_min) {
        CurveShape::VShape
    } else if interior.contains(&idx_max) {
        CurveShape::AShape
    } else if idx_min == 0 && idx_max == last {
        CurveShape::WayUp
    } else if idx_max == 0 && idx_min == last {
        CurveShape::WayDown
    } else if window[last] >= window[0] {
        CurveShape::WayUp
    } else {
        CurveShape::WayDown
    };
    Some(shape)
}

/// Rebound record for the newest `REBOUND_DAYS` closes of `closes`.
///
/// `rsi_14` is passed through untouched so both dashboard tables report the
/// same oscillator value. With fewer than five closes only `rsi_14` is set.
pub fn rebound(closes: &[f64], rsi_14: Option<f64>) -> ReboundRecord {
    let mut record = ReboundRecord {
        rsi_14,
        ..ReboundRecord::default()
    };
    if closes.len() < REBOUND_DAYS {
        return record;
    }

    let window = &closes[closes.len() - REBOUND_DAYS..];
    record.curve_shape = classify_curve(window);

    let c0 = window[0];
    let c4 = window[REBOUND_DAYS - 1];
    let pl = window.iter().copied().fold(f64::INFINITY, f64::min);

    if pl.is_finite() && pl > 0.0 {
        let g1 = (c0 - pl) / pl;
        let g5 = (c4 - pl) / pl;
        record.ri = round_to(g1 * g5 * 1_000_000.0, 2);
        record.p1_pl = round_to(g1 * 1000.0, 2);
        record.p5_pl = round_to(g5 * 1000.0, 2);
    }
    if c0 != 0.0 {
        record.d5_d1_gain_ratio = round_to((c4 - c0) / c0, 4);
    }
    record
}

/// Index of the element that wins `better` against every earlier winner.
/// Strict comparisons keep the first occurrence on ties.
fn first_index_by(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best
}
