// =============================================================================
// Indicator Dispatcher
// =============================================================================
//
// Runs one calculation request end to end:
//
//   name lookup -> candle normalization -> parameter defaults & validation
//               -> numeric backend -> result formatting
//
// The backend is chosen once, at construction, from an injected capability.
// A dispatcher holds no per-request state and is shared across handlers.
// =============================================================================

use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::formatter::{self, Computed, FailureEnvelope, IndicatorResponse, ResultEnvelope};
use crate::indicators::{select_backend, BackendCapability, BackendKind, NumericBackend};
use crate::market_data::{normalize, CandleSeries};
use crate::registry::{IndicatorKind, IndicatorSpec};
use crate::types::Parameters;
use crate::validation::{validate, IndicatorParams, ResolvedParams};

/// One calculation request as it arrives at the boundary.
///
/// Candles and parameters stay raw JSON here so that their coercion errors
/// are reported as structured engine failures rather than decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorRequest {
    #[serde(rename = "indicatorName", alias = "indicator", alias = "name", default)]
    pub indicator_name: String,

    #[serde(alias = "candleData", default)]
    pub candles: Value,

    #[serde(alias = "params", default)]
    pub parameters: Option<Value>,
}

impl IndicatorRequest {
    pub fn new(indicator_name: impl Into<String>, candles: Value, parameters: Value) -> Self {
        Self {
            indicator_name: indicator_name.into(),
            candles,
            parameters: Some(parameters),
        }
    }
}

pub struct Dispatcher {
    backend: Box<dyn NumericBackend>,
}

impl Dispatcher {
    pub fn new(capability: BackendCapability) -> Self {
        Self {
            backend: select_backend(capability),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Every registered indicator spec, in registry order.
    pub fn catalog() -> Vec<&'static IndicatorSpec> {
        IndicatorKind::ALL.iter().map(|k| k.spec()).collect()
    }

    /// Spec for a single indicator name.
    pub fn spec(name: &str) -> Result<&'static IndicatorSpec> {
        IndicatorKind::lookup(name).map(IndicatorKind::spec)
    }

    /// Compute one indicator. Every failure is a structured `EngineError`;
    /// insufficient history is a success with no defined points.
    pub fn calculate(&self, request: &IndicatorRequest) -> Result<ResultEnvelope> {
        let started = Instant::now();

        let kind = IndicatorKind::lookup(&request.indicator_name)?;
        let candles = normalize(&request.candles)?;
        let supplied = Parameters::from_json(request.parameters.as_ref())?;
        let resolved = ResolvedParams::resolve(kind.spec(), &supplied);
        let params = validate(kind, &resolved)?;

        let computed = self.compute(params, &candles);
        let envelope = formatter::format(&resolved, &candles, computed);

        debug!(
            indicator = %kind,
            backend = %self.backend.kind(),
            data_points = envelope.metadata.data_points,
            calculated_points = envelope.metadata.calculated_points,
            elapsed_us = started.elapsed().as_micros() as u64,
            "indicator calculated"
        );
        Ok(envelope)
    }

    /// `calculate`, with failures folded into a failure envelope.
    pub fn respond(&self, request: &IndicatorRequest) -> IndicatorResponse {
        match self.calculate(request) {
            Ok(envelope) => IndicatorResponse::Success(envelope),
            Err(err) => {
                warn!(
                    indicator = %request.indicator_name,
                    kind = %err.kind(),
                    error = %err,
                    "indicator request rejected"
                );
                let name = Some(request.indicator_name.as_str()).filter(|n| !n.is_empty());
                IndicatorResponse::Failure(FailureEnvelope::from_error(&err, name))
            }
        }
    }

    fn compute(&self, params: IndicatorParams, candles: &CandleSeries) -> Computed {
        let backend = self.backend.as_ref();
        let close = candles.closes();

        match params {
            IndicatorParams::Sma { period } => Computed::Sma {
                period,
                series: backend.sma(&close, period),
            },
            IndicatorParams::Ema { period } => Computed::Ema {
                period,
                series: backend.ema(&close, period),
            },
            IndicatorParams::Rsi { period } => Computed::Rsi {
                period,
                series: backend.rsi(&close, period),
            },
            IndicatorParams::Macd { fast, slow, signal } => {
                Computed::Macd(backend.macd(&close, fast, slow, signal))
            }
            IndicatorParams::Bollinger { period, std_dev } => Computed::Bollinger {
                period,
                series: backend.bbands(&close, period, std_dev, std_dev),
            },
            IndicatorParams::Atr { period } => {
                let (high, low) = (candles.highs(), candles.lows());
                Computed::Atr {
                    period,
                    series: backend.atr(&high, &low, &close, period),
                }
            }
            IndicatorParams::Stochastic { period } => {
                let (high, low) = (candles.highs(), candles.lows());
                Computed::Stochastic {
                    period,
                    series: backend.stochastic(&high, &low, &close, period),
                }
            }
        }
    }
}
