// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicator algorithms. Each
// algorithm file carries a `reference` routine (the literal formula) and an
// `optimized` routine (linear-time windowing); `backend` binds them into the
// Fallback and Primary backends. Every public function returns an aligned
// series so callers handle insufficient data by looking for `None`, never by
// catching an error.

pub mod atr;
pub mod backend;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;
pub mod stochastic;

pub use backend::{
    select_backend, BackendCapability, BackendKind, FallbackBackend, NumericBackend,
    PrimaryBackend,
};
pub use series::{BandSeries, MacdSeries, Series, StochasticSeries};
