// =============================================================================
// Indicator Engine — library root
// =============================================================================
//
// Technical indicators over OHLCV candle series, returned as chart-ready
// envelopes. The binary in `main.rs` wraps this library in an HTTP server and
// a one-shot stdin mode.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod indicators;
pub mod market_data;
pub mod registry;
pub mod runtime_config;
pub mod types;
pub mod validation;

pub use dispatcher::{Dispatcher, IndicatorRequest};
pub use error::{EngineError, ErrorKind, Result};
pub use formatter::{IndicatorResponse, ResultEnvelope};
pub use indicators::{BackendCapability, BackendKind};
pub use registry::{IndicatorKind, IndicatorSpec};
