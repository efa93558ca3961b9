// =============================================================================
// Parameter resolution & validation
// =============================================================================
//
// Applies the indicator's defaults to the caller's parameters and checks the
// computational ones before any numeric work:
//
//   - period-style parameters must be JSON integers >= 1 (14.0 is rejected)
//   - MACD requires fastPeriod < slowPeriod (never silently swapped)
//   - Bollinger stdDev must be a positive number
//
// Style and level parameters (colors, lineWidth, overbought/oversold) are
// passed through untouched. Unknown extra parameters are ignored.
// =============================================================================

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{EngineError, Result};
use crate::registry::{IndicatorKind, IndicatorSpec, ParamRole};
use crate::types::{ParamValue, Parameters};

/// Parameters after defaulting, keyed by the indicator's parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    spec: &'static IndicatorSpec,
    values: BTreeMap<&'static str, ParamValue>,
}

impl ResolvedParams {
    /// Fill every parameter the indicator defines, preferring the caller's value.
    pub fn resolve(spec: &'static IndicatorSpec, supplied: &Parameters) -> Self {
        let values = spec
            .parameters
            .iter()
            .map(|def| {
                let value = supplied
                    .get(def.name)
                    .cloned()
                    .unwrap_or_else(|| def.default.to_value());
                (def.name, value)
            })
            .collect();
        Self { spec, values }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Owned copy of a parameter. Names the indicator does not define
    /// yield an empty string so presentation code never has to unwrap.
    pub fn value(&self, name: &str) -> ParamValue {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| ParamValue::Text(String::new()))
    }

    /// Computational and level parameters, as echoed in result metadata.
    pub fn reported(&self) -> BTreeMap<&'static str, ParamValue> {
        self.spec
            .parameters
            .iter()
            .filter(|def| def.role != ParamRole::Style)
            .filter_map(|def| self.values.get(def.name).map(|v| (def.name, v.clone())))
            .collect()
    }
}

/// Typed, validated parameters: one variant per indicator kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorParams {
    Sma { period: usize },
    Ema { period: usize },
    Rsi { period: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { period: usize, std_dev: f64 },
    Atr { period: usize },
    Stochastic { period: usize },
}

/// Validate resolved parameters for `kind`.
pub fn validate(kind: IndicatorKind, params: &ResolvedParams) -> Result<IndicatorParams> {
    let validated = match kind {
        IndicatorKind::Sma => IndicatorParams::Sma {
            period: period(params, "period")?,
        },
        IndicatorKind::Ema => IndicatorParams::Ema {
            period: period(params, "period")?,
        },
        IndicatorKind::Rsi => IndicatorParams::Rsi {
            period: period(params, "period")?,
        },
        IndicatorKind::Macd => {
            let fast = period(params, "fastPeriod")?;
            let slow = period(params, "slowPeriod")?;
            let signal = period(params, "signalPeriod")?;
            if fast >= slow {
                return Err(reject(
                    kind,
                    format!("fastPeriod ({fast}) must be less than slowPeriod ({slow})"),
                ));
            }
            IndicatorParams::Macd { fast, slow, signal }
        }
        IndicatorKind::Bollinger => IndicatorParams::Bollinger {
            period: period(params, "period")?,
            std_dev: positive_number(params, "stdDev")?,
        },
        IndicatorKind::Atr => IndicatorParams::Atr {
            period: period(params, "period")?,
        },
        IndicatorKind::Stochastic => IndicatorParams::Stochastic {
            period: period(params, "period")?,
        },
    };
    Ok(validated)
}

fn period(params: &ResolvedParams, name: &str) -> Result<usize> {
    match params.get(name) {
        Some(ParamValue::Int(v)) if *v >= 1 => usize::try_from(*v)
            .map_err(|_| invalid(name, format!("{name} is too large ({v})"))),
        Some(other) => Err(invalid(
            name,
            format!("{name} must be a positive integer, got {other}"),
        )),
        None => Err(invalid(name, format!("{name} is required"))),
    }
}

fn positive_number(params: &ResolvedParams, name: &str) -> Result<f64> {
    match params.get(name).and_then(ParamValue::as_f64) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid(
            name,
            format!("{name} must be a positive number, got {}", params.value(name)),
        )),
    }
}

fn invalid(name: &str, message: String) -> EngineError {
    warn!(parameter = name, reason = %message, "parameter rejected");
    EngineError::InvalidParameters(message)
}

fn reject(kind: IndicatorKind, message: String) -> EngineError {
    warn!(indicator = %kind, reason = %message, "parameters rejected");
    EngineError::InvalidParameters(message)
}
