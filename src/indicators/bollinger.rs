// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band
// (SMA + up * σ) and a lower band (SMA - down * σ), where σ is the population
// standard deviation of the same trailing window the SMA uses.
// =============================================================================

use super::series::{undefined, BandSeries};
use super::sma::DRIFT_LIMIT;

/// Reference bands: two passes over every window.
pub fn reference(close: &[f64], period: usize, nbdev_up: f64, nbdev_down: f64) -> BandSeries {
    let n = close.len();
    let mut bands = empty(n);
    if period == 0 || n < period {
        return bands;
    }

    let p = period as f64;
    for (start, window) in close.windows(period).enumerate() {
        let i = start + period - 1;
        let middle = window.iter().sum::<f64>() / p;
        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / p;
        set(&mut bands, i, middle, variance.sqrt(), nbdev_up, nbdev_down);
    }
    bands
}

/// Rolling bands, O(n).
///
/// Sums and sums of squares are kept relative to an anchor (the first close of
/// the window at the last resync) so that the `E[x²] - E[x]²` form works on
/// small deviations instead of raw prices. Both sums are recomputed exactly
/// whenever the window start reaches a multiple of `period`, and also as soon
/// as the rounding carried by the running sums could reach the current mean
/// or variance (a flat stretch after a price jump, for instance).
pub fn optimized(close: &[f64], period: usize, nbdev_up: f64, nbdev_down: f64) -> BandSeries {
    let n = close.len();
    let mut bands = empty(n);
    if period == 0 || n < period {
        return bands;
    }

    let p = period as f64;
    let mut acc = Moments::default();

    for i in period - 1..n {
        let start = i + 1 - period;
        if start % period == 0 {
            acc.rebuild(&close[start..=i]);
        } else {
            acc.slide(close[i], close[start - 1]);
            if acc.drifted(p) {
                acc.rebuild(&close[start..=i]);
            }
        }

        let (middle, variance) = acc.mean_variance(p);
        set(&mut bands, i, middle, variance.sqrt(), nbdev_up, nbdev_down);
    }
    bands
}

/// Anchored running moments of the current window.
#[derive(Debug, Default)]
struct Moments {
    anchor: f64,
    sum: f64,
    sum_sq: f64,
    /// Magnitudes added and removed since the last rebuild; they bound the
    /// rounding error held in `sum` and `sum_sq`.
    churn: f64,
    churn_sq: f64,
}

impl Moments {
    fn rebuild(&mut self, window: &[f64]) {
        self.anchor = window.first().copied().unwrap_or(0.0);
        self.sum = 0.0;
        self.sum_sq = 0.0;
        self.churn = 0.0;
        for &x in window {
            let d = x - self.anchor;
            self.sum += d;
            self.sum_sq += d * d;
            self.churn += d.abs();
        }
        self.churn_sq = self.sum_sq;
    }

    fn slide(&mut self, enter: f64, leave: f64) {
        let enter = enter - self.anchor;
        let leave = leave - self.anchor;
        self.sum += enter - leave;
        self.sum_sq += enter * enter - leave * leave;
        self.churn += enter.abs() + leave.abs();
        self.churn_sq += enter * enter + leave * leave;
    }

    fn mean_variance(&self, p: f64) -> (f64, f64) {
        let mean_dev = self.sum / p;
        let variance = (self.sum_sq / p - mean_dev * mean_dev).max(0.0);
        (self.anchor + mean_dev, variance)
    }

    /// Whether the running sums can no longer be trusted to 1e-9 relative.
    fn drifted(&self, p: f64) -> bool {
        let (middle, variance) = self.mean_variance(p);
        let mean_dev = self.sum / p;
        let mean_noise = self.churn / p + self.anchor.abs();
        let variance_noise = self.churn_sq / p + 2.0 * mean_dev.abs() * self.churn / p;
        mean_noise > DRIFT_LIMIT * middle.abs() || variance_noise > DRIFT_LIMIT * variance
    }
}

fn empty(n: usize) -> BandSeries {
    BandSeries {
        upper: undefined(n),
        middle: undefined(n),
        lower: undefined(n),
    }
}

fn set(bands: &mut BandSeries, i: usize, middle: f64, std_dev: f64, up: f64, down: f64) {
    bands.upper[i] = Some(middle + std_dev * up);
    bands.middle[i] = Some(middle);
    bands.lower[i] = Some(middle - std_dev * down);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::defined_count;
    use crate::indicators::sma;

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    fn assert_bands_match(a: &BandSeries, b: &BandSeries) {
        for (la, lb) in [(&a.upper, &b.upper), (&a.middle, &b.middle), (&a.lower, &b.lower)] {
            for (x, y) in la.iter().zip(lb.iter()) {
                match (x, y) {
                    (Some(x), Some(y)) => assert!(close_enough(*x, *y), "{x} vs {y}"),
                    (None, None) => {}
                    _ => panic!("definedness differs"),
                }
            }
        }
    }

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = reference(&closes, 20, 2.0, 2.0);
        let (u, m, l) = (bb.upper[19].unwrap(), bb.middle[19].unwrap(), bb.lower[19].unwrap());
        assert!((m - 10.5).abs() < 1e-12);
        // Population std of 1..=20 is sqrt((20^2 - 1) / 12).
        let std = ((400.0_f64 - 1.0) / 12.0).sqrt();
        assert!((u - (m + 2.0 * std)).abs() < 1e-10);
        assert!((l - (m - 2.0 * std)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = optimized(&[1.0, 2.0, 3.0], 20, 2.0, 2.0);
        assert_eq!(defined_count(&bb.middle), 0);
        assert_eq!(defined_count(&bb.upper), 0);
    }

    #[test]
    fn bollinger_flat() {
        for bb in [
            reference(&[100.0; 30], 20, 2.0, 2.0),
            optimized(&[100.0; 30], 20, 2.0, 2.0),
        ] {
            assert_eq!(defined_count(&bb.middle), 11);
            for i in 19..30 {
                assert_eq!(bb.upper[i], bb.middle[i]);
                assert_eq!(bb.lower[i], bb.middle[i]);
            }
        }
    }

    #[test]
    fn asymmetric_deviations() {
        let closes: Vec<f64> = (0..25).map(|i| 10.0 + (i % 4) as f64).collect();
        let bb = reference(&closes, 5, 2.0, 1.0);
        let m = bb.middle[10].unwrap();
        let up = bb.upper[10].unwrap() - m;
        let down = m - bb.lower[10].unwrap();
        assert!((up - 2.0 * down).abs() < 1e-12);
    }

    #[test]
    fn middle_matches_sma() {
        let closes: Vec<f64> = (0..60).map(|i| 30.0 + (i as f64 * 0.3).sin()).collect();
        let bb = reference(&closes, 10, 2.0, 2.0);
        assert_eq!(bb.middle, sma::reference(&closes, 10));
    }

    #[test]
    fn optimized_matches_reference() {
        let closes: Vec<f64> = (0..500)
            .map(|i| 250.0 + (i as f64 * 0.17).sin() * 20.0 + (i as f64 * 1.3).cos() * 2.0)
            .collect();
        for period in [5, 20, 50] {
            let a = reference(&closes, period, 2.0, 2.5);
            let b = optimized(&closes, period, 2.0, 2.5);
            assert_bands_match(&a, &b);
        }
    }

    #[test]
    fn flat_window_after_jump_has_no_width() {
        let mut closes = vec![3.1, 7.9, 2.2, 8.8, 4.4, 1000.7];
        closes.extend([5.3; 10]);
        let bb = optimized(&closes, 5, 2.0, 2.0);
        for i in 10..closes.len() {
            assert_eq!(bb.upper[i], bb.middle[i], "index {i}");
            assert_eq!(bb.lower[i], bb.middle[i], "index {i}");
        }
        for period in 2..=5 {
            assert_bands_match(
                &reference(&closes, period, 2.0, 2.0),
                &optimized(&closes, period, 2.0, 2.0),
            );
        }
    }
}
