// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — gain_i = max(close_i - close_{i-1}, 0), loss_i = max(close_{i-1} - close_i, 0)
// Step 2 — Seed average gain / loss at index `period` with the mean of
//          gain/loss over indices 1..=period.
// Step 3 — Wilder's smoothing for later indices:
//            avg_gain = (prev_avg_gain * (period - 1) + gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first defined RSI sits at index `period`.
// =============================================================================

use super::series::{undefined, Series};

/// Reference RSI: materialise gain/loss arrays, then smooth.
///
/// # Edge cases
/// - `period == 0` => all undefined
/// - `closes.len() <= period` => all undefined (need `period` deltas)
/// - Average loss of zero => 100, including a perfectly flat market.
pub fn reference(closes: &[f64], period: usize) -> Series {
    let n = closes.len();
    let mut out = undefined(n);
    if period == 0 || n <= period {
        return out;
    }

    let mut gains = vec![0.0_f64; n];
    let mut losses = vec![0.0_f64; n];
    for i in 1..n {
        gains[i] = (closes[i] - closes[i - 1]).max(0.0);
        losses[i] = (closes[i - 1] - closes[i]).max(0.0);
    }

    let p = period as f64;
    let mut avg_gain = gains[1..=period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[1..=period].iter().sum::<f64>() / p;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period + 1..n {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

/// Single-pass RSI without the intermediate gain/loss arrays.
pub fn optimized(closes: &[f64], period: usize) -> Series {
    let n = closes.len();
    let mut out = undefined(n);
    if period == 0 || n <= period {
        return out;
    }

    let p = period as f64;
    let (mut sum_gain, mut sum_loss) = (0.0_f64, 0.0_f64);
    for w in closes[..=period].windows(2) {
        sum_gain += (w[1] - w[0]).max(0.0);
        sum_loss += (w[0] - w[1]).max(0.0);
    }

    let mut avg_gain = sum_gain / p;
    let mut avg_loss = sum_loss / p;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period + 1..n {
        let delta = closes[i] - closes[i - 1];
        avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// A zero average loss means RS is +infinity, so RSI is 100. This is handled
/// before the division so a flat market never produces NaN.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::defined_count;

    #[test]
    fn rsi_empty_input() {
        assert!(reference(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(reference(&[1.0, 2.0, 3.0], 0), undefined(3));
        assert_eq!(optimized(&[1.0, 2.0, 3.0], 0), undefined(3));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert_eq!(defined_count(&reference(&closes, 14)), 0);
        assert_eq!(defined_count(&optimized(&closes, 14)), 0);
    }

    #[test]
    fn first_value_at_period() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = reference(&closes, 14);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
        assert_eq!(defined_count(&series), 6);
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in reference(&closes, 14).iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in reference(&closes, 14).iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn flat_market_is_one_hundred() {
        // No movement => avg_loss == 0 => RS = +inf => RSI = 100.
        let closes = vec![10.0; 20];
        for series in [reference(&closes, 14), optimized(&closes, 14)] {
            assert_eq!(defined_count(&series), 6);
            for v in series.iter().flatten() {
                assert_eq!(*v, 100.0);
            }
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89,
            46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = reference(&closes, 14);
        assert_eq!(defined_count(&series), 4);
        for &v in series.iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn optimized_matches_reference() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 80.0 + (i as f64 * 0.4).sin() * 5.0 + (i as f64 * 0.07).cos())
            .collect();
        let a = reference(&closes, 14);
        let b = optimized(&closes, 14);
        for (x, y) in a.iter().zip(&b) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() <= 1e-9 * x.abs().max(y.abs())),
                (None, None) => {}
                _ => panic!("definedness differs"),
            }
        }
    }
}
