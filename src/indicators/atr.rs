// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR_0 = H_0 - L_0
//   TR_i = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the simple moving average of TR over `period` bars. Wilder's
// recursive smoothing is not used, so both backends agree with the plain
// windowed mean.
// =============================================================================

use super::series::Series;
use super::sma;

/// True range for every bar; the first bar has no previous close and uses
/// its own high-low range.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    (0..n)
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return hl;
            }
            let prev_close = close[i - 1];
            let hc = (high[i] - prev_close).abs();
            let lc = (low[i] - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

pub fn reference(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
    sma::reference(&true_range(high, low, close), period)
}

pub fn optimized(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
    sma::optimized(&true_range(high, low, close), period)
}
