// =============================================================================
// Shared types used across the indicator engine
// =============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{EngineError, Result};

/// How a result is laid out on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayType {
    #[serde(rename = "single-line")]
    SingleLine,
    #[serde(rename = "multi-line")]
    MultiLine,
    #[serde(rename = "band")]
    Band,
}

/// Which pane the indicator is drawn in: overlaid on price or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Main,
    Sub,
}

/// A single parameter value as supplied by the caller.
///
/// Serialises untagged so that it round-trips to the same JSON scalar it was
/// read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Convert a raw JSON value. Anything other than a number or a string is
    /// rejected.
    pub fn from_json(name: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if n.is_u64() {
                    Err(EngineError::InvalidParameters(format!(
                        "parameter '{name}' is out of range"
                    )))
                } else {
                    n.as_f64().map(Self::Float).ok_or_else(|| {
                        EngineError::InvalidParameters(format!(
                            "parameter '{name}' is not a finite number"
                        ))
                    })
                }
            }
            Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(EngineError::InvalidParameters(format!(
                "parameter '{name}' has unsupported type ({})",
                json_type_name(other)
            ))),
        }
    }

    /// Numeric view of the value; strings are never numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

/// Integers print bare; floats always keep a fractional part (`2.0`, not
/// `2`) so titles and messages show the number the caller sent.
impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Caller-supplied parameter mapping, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw `parameters` payload. Absent or `null` means no
    /// overrides; anything other than an object is rejected.
    pub fn from_json(raw: Option<&Value>) -> Result<Self> {
        match raw {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(Value::Object(map)) => {
                let mut params = BTreeMap::new();
                for (name, value) in map {
                    params.insert(name.clone(), ParamValue::from_json(name, value)?);
                }
                Ok(Self(params))
            }
            Some(other) => Err(EngineError::InvalidParameters(format!(
                "parameters must be an object, got {}",
                json_type_name(other)
            ))),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }
}

/// The externally visible chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedValue {
    pub time: i64,
    pub value: f64,
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_stay_integers() {
        let v = ParamValue::from_json("period", &json!(14)).unwrap();
        assert_eq!(v, ParamValue::Int(14));
    }

    #[test]
    fn float_with_zero_fraction_is_float() {
        let v = ParamValue::from_json("period", &json!(14.0)).unwrap();
        assert_eq!(v, ParamValue::Float(14.0));
    }

    #[test]
    fn bool_and_null_rejected() {
        assert!(ParamValue::from_json("period", &json!(true)).is_err());
        assert!(ParamValue::from_json("period", &json!(null)).is_err());
    }

    #[test]
    fn parameters_must_be_object() {
        let err = Parameters::from_json(Some(&json!([1, 2]))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidParameters);
        assert_eq!(Parameters::from_json(None).unwrap(), Parameters::new());
    }

    #[test]
    fn display_types_serialise_kebab() {
        assert_eq!(
            serde_json::to_string(&DisplayType::SingleLine).unwrap(),
            "\"single-line\""
        );
        assert_eq!(serde_json::to_string(&ChartType::Sub).unwrap(), "\"sub\"");
    }

    #[test]
    fn float_display_keeps_fraction() {
        assert_eq!(ParamValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ParamValue::Float(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::Int(2).to_string(), "2");
    }

    #[test]
    fn param_value_serialises_untagged() {
        let p = ParamValue::Text("#2196F3".into());
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"#2196F3\"");
        assert_eq!(serde_json::to_string(&ParamValue::Int(2)).unwrap(), "2");
    }
}
