// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd      = EMA(close, fast) - EMA(close, slow)
//   signal    = EMA(defined macd values, signal_period), right-aligned
//   histogram = macd - signal
//
// The signal EMA is seeded from the first `signal_period` *defined* MACD
// points, not from absolute array position. With fewer defined MACD points
// than `signal_period`, signal and histogram are entirely undefined.
// =============================================================================

use super::ema;
use super::series::{smooth_defined, zip_with, MacdSeries, Series};

pub fn reference(close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    compose(close, fast, slow, signal, ema::reference)
}

pub fn optimized(close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    compose(close, fast, slow, signal, ema::optimized)
}

/// Build the three MACD lines from a given EMA routine.
fn compose(
    close: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
    ema: fn(&[f64], usize) -> Series,
) -> MacdSeries {
    let fast_line = ema(close, fast);
    let slow_line = ema(close, slow);
    let macd = zip_with(&fast_line, &slow_line, |f, s| f - s);

    let signal_line = smooth_defined(&macd, signal, ema);
    let histogram = zip_with(&macd, &signal_line, |m, s| m - s);

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
