// =============================================================================
// Candle Series Normalizer
// =============================================================================
//
// Coerces the raw candle payload into a typed `CandleSeries`. Each record's
// OHLCV fields become f64 and `time` becomes i64; absent fields default to 0.
// Numbers may also arrive as numeric strings. Ordering and OHLC consistency
// are not checked here.
// =============================================================================

use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::market_data::{Candle, CandleSeries};
use crate::types::json_type_name;

/// Normalize a raw JSON candle payload.
///
/// Fails with `InvalidInput` when the payload is not an array, is empty, or a
/// record/field cannot be coerced.
pub fn normalize(raw: &Value) -> Result<CandleSeries> {
    let records = raw.as_array().ok_or_else(|| {
        EngineError::InvalidInput(format!(
            "candles must be an array, got {}",
            json_type_name(raw)
        ))
    })?;

    if records.is_empty() {
        return Err(EngineError::InvalidInput(
            "candles must not be empty".to_string(),
        ));
    }

    let candles = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record))
        .collect::<Result<Vec<_>>>()?;

    CandleSeries::new(candles)
}

fn normalize_record(index: usize, record: &Value) -> Result<Candle> {
    let fields = record.as_object().ok_or_else(|| {
        EngineError::InvalidInput(format!(
            "candle {index} must be an object, got {}",
            json_type_name(record)
        ))
    })?;

    Ok(Candle {
        time: coerce_time(index, fields)?,
        open: coerce_f64(index, fields, "open")?,
        high: coerce_f64(index, fields, "high")?,
        low: coerce_f64(index, fields, "low")?,
        close: coerce_f64(index, fields, "close")?,
        volume: coerce_f64(index, fields, "volume")?,
    })
}

fn coerce_f64(index: usize, fields: &Map<String, Value>, name: &str) -> Result<f64> {
    let value = match fields.get(name) {
        None => return Ok(0.0),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid_field(index, name, value)),
    }
}

fn coerce_time(index: usize, fields: &Map<String, Value>) -> Result<i64> {
    let value = match fields.get("time") {
        None => return Ok(0),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_i64))
        }
        _ => None,
    };

    parsed.ok_or_else(|| invalid_field(index, "time", value))
}

/// Truncate toward zero, rejecting values outside the i64 range.
fn truncate_i64(v: f64) -> Option<i64> {
    if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v.trunc() as i64)
    } else {
        None
    }
}

fn invalid_field(index: usize, name: &str, value: &Value) -> EngineError {
    EngineError::InvalidInput(format!(
        "candle {index} field '{name}' cannot be read as a number ({value})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn well_formed_payload() {
        let raw = json!([
            {"time": 1, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 100},
            {"time": 2, "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0, "volume": 50},
        ]);
        let series = normalize(&raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.5, 2.0]);
        assert_eq!(series.candles()[0].volume, 100.0);
    }

    #[test]
    fn absent_fields_default_to_zero() {
        let series = normalize(&json!([{"close": 5}])).unwrap();
        let c = series.candles()[0];
        assert_eq!(c.time, 0);
        assert_eq!(c.open, 0.0);
        assert_eq!(c.close, 5.0);
        assert_eq!(c.volume, 0.0);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let series = normalize(&json!([{"time": "1700000000", "close": " 42.5 "}])).unwrap();
        assert_eq!(series.candles()[0].time, 1_700_000_000);
        assert_eq!(series.candles()[0].close, 42.5);
    }

    #[test]
    fn fractional_time_truncates() {
        let series = normalize(&json!([{"time": 12.9, "close": 1}])).unwrap();
        assert_eq!(series.candles()[0].time, 12);
    }

    #[test]
    fn empty_array_is_invalid_input() {
        let err = normalize(&json!([])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn non_array_is_invalid_input() {
        let err = normalize(&json!({"close": 1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("must be an array"));
    }

    #[test]
    fn non_object_record_is_invalid_input() {
        let err = normalize(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn garbage_field_names_index() {
        let err = normalize(&json!([{"close": 1}, {"close": "abc"}])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("candle 1"));
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn null_field_rejected() {
        let err = normalize(&json!([{"close": null}])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn non_finite_string_rejected() {
        let err = normalize(&json!([{"close": "NaN"}])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
