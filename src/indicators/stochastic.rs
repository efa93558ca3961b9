// =============================================================================
// Stochastic Oscillator
// =============================================================================
//
//   %K_i = 100 * (close_i - LL) / (HH - LL)      HH/LL over the last `period` bars
//   %D   = SMA(%K, 3)
//
// A flat window (HH == LL) yields %K = 50 rather than dividing by zero.
// =============================================================================

use std::collections::VecDeque;

use super::series::{smooth_defined, undefined, Series, StochasticSeries};
use super::sma;

/// Length of the %D smoothing window.
pub const SMOOTHING: usize = 3;

/// %K value used when the lookback window has no range.
const FLAT_RANGE_K: f64 = 50.0;

/// Reference form: scan every window for its extremes.
pub fn reference(high: &[f64], low: &[f64], close: &[f64], period: usize) -> StochasticSeries {
    let n = high.len().min(low.len()).min(close.len());
    let mut k = undefined(n);
    if period > 0 && n >= period {
        for i in period - 1..n {
            let start = i + 1 - period;
            let hh = high[start..=i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let ll = low[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
            k[i] = Some(percent_k(close[i], hh, ll));
        }
    }
    finish(k, sma::reference)
}

/// Monotonic-deque form, O(n): the deques hold indices of candidate extremes
/// in the current window, front = current max/min.
pub fn optimized(high: &[f64], low: &[f64], close: &[f64], period: usize) -> StochasticSeries {
    let n = high.len().min(low.len()).min(close.len());
    let mut k = undefined(n);
    if period > 0 && n >= period {
        let mut highs: VecDeque<usize> = VecDeque::with_capacity(period);
        let mut lows: VecDeque<usize> = VecDeque::with_capacity(period);

        for i in 0..n {
            while highs.back().is_some_and(|&j| high[j] <= high[i]) {
                highs.pop_back();
            }
            highs.push_back(i);
            while lows.back().is_some_and(|&j| low[j] >= low[i]) {
                lows.pop_back();
            }
            lows.push_back(i);

            if i + 1 < period {
                continue;
            }
            let start = i + 1 - period;
            while highs.front().is_some_and(|&j| j < start) {
                highs.pop_front();
            }
            while lows.front().is_some_and(|&j| j < start) {
                lows.pop_front();
            }

            if let (Some(&hi), Some(&lo)) = (highs.front(), lows.front()) {
                k[i] = Some(percent_k(close[i], high[hi], low[lo]));
            }
        }
    }
    finish(k, sma::optimized)
}

fn percent_k(close: f64, hh: f64, ll: f64) -> f64 {
    if hh == ll {
        FLAT_RANGE_K
    } else {
        100.0 * (close - ll) / (hh - ll)
    }
}

fn finish(k: Series, smoother: fn(&[f64], usize) -> Series) -> StochasticSeries {
    let d = smooth_defined(&k, SMOOTHING, smoother);
    StochasticSeries { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::defined_count;

    fn bars(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mid: Vec<f64> = (0..n)
            .map(|i| 50.0 + (i as f64 * 0.45).sin() * 6.0 + (i as f64 * 0.13).cos() * 2.0)
            .collect();
        let high = mid.iter().map(|m| m + 1.5).collect();
        let low = mid.iter().map(|m| m - 1.5).collect();
        let close = mid.iter().enumerate().map(|(i, m)| m + (i % 3) as f64 * 0.5 - 0.5).collect();
        (high, low, close)
    }

    #[test]
    fn warmup_lengths() {
        let (h, l, c) = bars(30);
        let out = reference(&h, &l, &c, 14);
        assert_eq!(defined_count(&out.k), 17);
        assert_eq!(defined_count(&out.d), 15);
        assert!(out.k[12].is_none() && out.k[13].is_some());
        assert!(out.d[14].is_none() && out.d[15].is_some());
    }

    #[test]
    fn flat_range_is_fifty() {
        let flat = vec![10.0; 20];
        for out in [
            reference(&flat, &flat, &flat, 5),
            optimized(&flat, &flat, &flat, 5),
        ] {
            for v in out.k.iter().flatten() {
                assert_eq!(*v, 50.0);
            }
            for v in out.d.iter().flatten() {
                assert_eq!(*v, 50.0);
            }
        }
    }

    #[test]
    fn close_at_extremes() {
        let high = vec![10.0, 12.0, 11.0];
        let low = vec![8.0, 9.0, 7.0];
        let at_high = reference(&high, &low, &[9.0, 10.0, 12.0], 3);
        assert_eq!(at_high.k[2], Some(100.0));
        let at_low = reference(&high, &low, &[9.0, 10.0, 7.0], 3);
        assert_eq!(at_low.k[2], Some(0.0));
    }

    #[test]
    fn insufficient_data() {
        let (h, l, c) = bars(4);
        let out = optimized(&h, &l, &c, 5);
        assert_eq!(out.k, undefined(4));
        assert_eq!(out.d, undefined(4));
    }

    #[test]
    fn optimized_matches_reference() {
        let (h, l, c) = bars(400);
        for period in [1, 5, 14, 40] {
            let a = reference(&h, &l, &c, period);
            let b = optimized(&h, &l, &c, period);
            assert_eq!(a.k, b.k, "%K must match exactly for period {period}");
            for (x, y) in a.d.iter().zip(&b.d) {
                match (x, y) {
                    (Some(x), Some(y)) => assert!((x - y).abs() <= 1e-9 * x.abs().max(y.abs())),
                    (None, None) => {}
                    _ => panic!("definedness differs"),
                }
            }
        }
    }
}
