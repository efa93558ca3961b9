// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_i = mean(values[i-p+1 ..= i])      for i >= p - 1
//
// Indices before p - 1 are undefined. When the input is shorter than the
// period the whole series is undefined.
// =============================================================================

use super::series::{undefined, Series};

/// Reference form: recompute every window.
pub fn reference(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }

    let p = period as f64;
    for (start, window) in values.windows(period).enumerate() {
        out[start + period - 1] = Some(window.iter().sum::<f64>() / p);
    }
    out
}

/// A running sum may carry this many multiples of its own magnitude in
/// additions and removals before it is recomputed from the window.
pub(super) const DRIFT_LIMIT: f64 = 1e3;

/// Running-sum form, O(n).
///
/// The sum is recomputed exactly each time the window start reaches a
/// multiple of `period`, and also whenever the values that passed through it
/// dwarf what is left (a large price leaving a window of small ones), so the
/// rounding error stays relative to the current window.
pub fn optimized(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut out = undefined(n);
    if period == 0 || n < period {
        return out;
    }

    let p = period as f64;
    let (mut sum, mut churn) = (0.0_f64, 0.0_f64);
    for i in period - 1..n {
        let start = i + 1 - period;
        let mut resync = start % period == 0;
        if !resync {
            let (enter, leave) = (values[i], values[start - 1]);
            sum += enter - leave;
            churn += enter.abs() + leave.abs();
            resync = churn > DRIFT_LIMIT * sum.abs();
        }
        if resync {
            let window = &values[start..=i];
            sum = window.iter().sum();
            churn = window.iter().map(|v| v.abs()).sum();
        }
        out[i] = Some(sum / p);
    }
    out
}
