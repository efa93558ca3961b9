// =============================================================================
// Aligned numeric series helpers
// =============================================================================
//
// Every algorithm returns a `Series` with the same length as its input.
// `None` marks the warm-up prefix; once a value is defined every later index
// is defined too.

/// An input-aligned series with `None` for warm-up indices.
pub type Series = Vec<Option<f64>>;

/// Output of MACD: three aligned lines.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// Output of Bollinger Bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

/// Output of the Stochastic oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Series,
    pub d: Series,
}

/// An all-undefined series of length `n`.
pub fn undefined(n: usize) -> Series {
    vec![None; n]
}

pub fn defined_count(series: &[Option<f64>]) -> usize {
    series.iter().filter(|v| v.is_some()).count()
}

/// The defined values of `series`, in order, with the warm-up prefix removed.
pub fn defined_values(series: &[Option<f64>]) -> Vec<f64> {
    series.iter().flatten().copied().collect()
}

/// Right-align `tail` to length `n`, padding the front with `None`.
pub fn right_align(n: usize, tail: Series) -> Series {
    let mut out = undefined(n.saturating_sub(tail.len()));
    out.extend(tail);
    out
}

/// Pointwise combination; undefined if either side is undefined.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Apply `smoother` to the defined suffix of `series` and right-align the
/// result, so the smoother is seeded from the first defined points rather
/// than from absolute array position.
pub fn smooth_defined(
    series: &[Option<f64>],
    period: usize,
    smoother: impl Fn(&[f64], usize) -> Series,
) -> Series {
    let defined = defined_values(series);
    if period == 0 || defined.len() < period {
        return undefined(series.len());
    }
    right_align(series.len(), smoother(&defined, period))
}
