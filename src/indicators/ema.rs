// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = (close_t - EMA_{t-1}) * multiplier + EMA_{t-1}
//
// The first EMA value, at index `period - 1`, is seeded with the SMA of the
// first `period` closes.
// =============================================================================

use super::series::{undefined, Series};

/// Reference EMA, aligned to the input.
///
/// # Edge cases
/// - `period == 0` => all undefined
/// - `values.len() < period` => all undefined
pub fn reference(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    let Some((seed, multiplier)) = seed(values, period) else {
        return out;
    };

    out[period - 1] = Some(seed);
    let mut prev = seed;
    for (i, &value) in values.iter().enumerate().skip(period) {
        let ema = (value - prev) * multiplier + prev;
        out[i] = Some(ema);
        prev = ema;
    }
    out
}

/// Same recurrence in the weighted-sum form
/// `close * multiplier + prev * (1 - multiplier)`.
pub fn optimized(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    let Some((seed, multiplier)) = seed(values, period) else {
        return out;
    };

    let keep = 1.0 - multiplier;
    out[period - 1] = Some(seed);
    let mut prev = seed;
    for (slot, &value) in out[period..].iter_mut().zip(&values[period..]) {
        prev = value * multiplier + prev * keep;
        *slot = Some(prev);
    }
    out
}

/// SMA seed and multiplier, or `None` when there is not enough data.
fn seed(values: &[f64], period: usize) -> Option<(f64, f64)> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sma = values[..period].iter().sum::<f64>() / period as f64;
    Some((sma, 2.0 / (period as f64 + 1.0)))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::defined_count;
    use crate::indicators::sma;

    /// Helper: build a simple ascending price series.
    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn ema_empty_input() {
        assert!(reference(&[], 5).is_empty());
        assert!(optimized(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert_eq!(reference(&[1.0, 2.0, 3.0], 0), undefined(3));
    }

    #[test]
    fn ema_insufficient_data() {
        assert_eq!(reference(&[1.0, 2.0], 5), undefined(2));
        assert_eq!(optimized(&[1.0, 2.0], 5), undefined(2));
    }

    #[test]
    fn ema_period_equals_length() {
        let ema = reference(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema, vec![None, None, Some(4.0)]);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10]: SMA seed = 3.0, multiplier = 1/3.
        let closes = ascending(10);
        let ema = reference(&closes, 5);
        assert_eq!(defined_count(&ema), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[4].unwrap() - expected).abs() < 1e-10);
        for i in 5..10 {
            expected = (closes[i] - expected) * mult + expected;
            let got = ema[i].unwrap();
            assert!((got - expected).abs() < 1e-10, "got {got}, expected {expected}");
        }
    }

    #[test]
    fn seed_equals_sma_exactly() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.9).cos() * 3.3).collect();
        for period in [1, 3, 12, 26] {
            let ema = reference(&closes, period);
            let sma = sma::reference(&closes, period);
            assert_eq!(ema[period - 1], sma[period - 1]);
            assert_eq!(optimized(&closes, period)[period - 1], sma[period - 1]);
        }
    }

    #[test]
    fn optimized_matches_reference() {
        let closes: Vec<f64> = (0..400)
            .map(|i| 100.0 + (i as f64 * 0.21).sin() * 12.0)
            .collect();
        let a = reference(&closes, 9);
        let b = optimized(&closes, 9);
        for (x, y) in a.iter().zip(&b) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() <= 1e-9 * x.abs().max(y.abs())),
                (None, None) => {}
                _ => panic!("definedness differs"),
            }
        }
    }

    #[test]
    fn flat_series_stays_flat() {
        let ema = optimized(&[100.0; 30], 10);
        for v in ema.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10);
        }
    }
}
