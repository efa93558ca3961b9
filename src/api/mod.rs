//! Outer surfaces: the HTTP router and the one-shot stdin runner. Neither
//! holds indicator logic; both only build requests for the dispatcher and
//! serialise what it returns.

pub mod rest;
pub mod stdio;

use serde::Serialize;

use crate::registry::IndicatorSpec;

/// One catalog entry, flattened next to `success: true`.
#[derive(Debug, Serialize)]
pub struct SpecEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub spec: &'static IndicatorSpec,
}

impl SpecEnvelope {
    pub fn new(spec: &'static IndicatorSpec) -> Self {
        Self {
            success: true,
            spec,
        }
    }
}
