// =============================================================================
// One-shot stdin/stdout runner
// =============================================================================
//
// Reads a single JSON request, writes a single JSON response line. Used when
// the engine is driven as a subprocess instead of over HTTP.
//
//   {"indicatorName": "rsi", "candles": [...], "parameters": {...}}
//   {"_mode": "metadata", "name": "rsi"}     -> catalog entry
//   {"_mode": "metadata"}                    -> whole catalog
//
// The caller maps the returned flag to the process exit code.
// =============================================================================

use std::io::{Read, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::SpecEnvelope;
use crate::dispatcher::{Dispatcher, IndicatorRequest};
use crate::error::EngineError;
use crate::formatter::{FailureEnvelope, IndicatorResponse};

const METADATA_MODE: &str = "metadata";

#[derive(Serialize)]
struct CatalogEnvelope {
    success: bool,
    data: Vec<&'static crate::registry::IndicatorSpec>,
}

/// Handle one request from `input`, writing the response to `output`.
/// Returns whether the request succeeded; `Err` is reserved for I/O failures.
pub fn run(dispatcher: &Dispatcher, mut input: impl Read, mut output: impl Write) -> Result<bool> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("failed to read request from stdin")?;

    let (body, success) = handle(dispatcher, &raw)?;
    writeln!(output, "{body}").context("failed to write response to stdout")?;
    output.flush().context("failed to flush stdout")?;
    Ok(success)
}

fn handle(dispatcher: &Dispatcher, raw: &str) -> Result<(String, bool)> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            let err = EngineError::InvalidInput(format!("request is not valid JSON: {e}"));
            return failure(&err, None);
        }
    };

    if value.get("_mode").and_then(Value::as_str) == Some(METADATA_MODE) {
        return metadata(&value);
    }

    let request: IndicatorRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            let err = EngineError::InvalidInput(format!("malformed request: {e}"));
            return failure(&err, None);
        }
    };

    debug!(indicator = %request.indicator_name, "stdin request");
    let response = dispatcher.respond(&request);
    let success = response.is_success();
    Ok((serialize(&response)?, success))
}

fn metadata(value: &Value) -> Result<(String, bool)> {
    let name = ["name", "indicatorName", "indicator"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str));

    match name {
        Some(name) => match Dispatcher::spec(name) {
            Ok(spec) => Ok((serialize(&SpecEnvelope::new(spec))?, true)),
            Err(err) => failure(&err, Some(name)),
        },
        None => {
            let catalog = CatalogEnvelope {
                success: true,
                data: Dispatcher::catalog(),
            };
            Ok((serialize(&catalog)?, true))
        }
    }
}

fn failure(err: &EngineError, indicator: Option<&str>) -> Result<(String, bool)> {
    let response = IndicatorResponse::Failure(FailureEnvelope::from_error(err, indicator));
    Ok((serialize(&response)?, false))
}

fn serialize(value: &impl Serialize) -> Result<String> {
    serde_json::to_string(value).context("failed to serialise response")
}
