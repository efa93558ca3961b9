// =============================================================================
// Runtime Configuration — engine settings from JSON file + environment
// =============================================================================
//
// Settings are read once at process start. All fields carry
// `#[serde(default)]` so that a partial (or empty) config file still loads;
// a missing or unreadable file falls back to defaults with a warning.
// Environment variables override whatever the file says.
//
//   INDICATOR_CONFIG          path of the JSON file (indicator_config.json)
//   INDICATOR_BIND_ADDR       HTTP listen address
//   INDICATOR_NATIVE_BACKEND  true/false: optimized numeric backend available
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::BackendCapability;

pub const CONFIG_PATH_ENV: &str = "INDICATOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "indicator_config.json";

const BIND_ADDR_ENV: &str = "INDICATOR_BIND_ADDR";
const NATIVE_BACKEND_ENV: &str = "INDICATOR_NATIVE_BACKEND";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

// =============================================================================
// EngineConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Whether the optimized (Primary) numeric backend may be used.
    #[serde(default = "default_true")]
    pub native_backend: bool,

    /// Maximum accepted request body. Large candle histories run to several
    /// megabytes of JSON.
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            native_backend: true,
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            native_backend = config.native_backend,
            "engine config loaded"
        );

        Ok(config)
    }

    /// File (or defaults) plus process environment overrides.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::load(&path).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "engine config unavailable, using defaults");
            Self::default()
        });
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a key lookup (the environment, in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(BIND_ADDR_ENV).filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }

        if let Some(raw) = lookup(NATIVE_BACKEND_ENV) {
            match parse_flag(&raw) {
                Some(flag) => self.native_backend = flag,
                None => warn!(
                    value = %raw,
                    "ignoring {NATIVE_BACKEND_ENV}: expected true/false"
                ),
            }
        }
    }

    pub fn backend_capability(&self) -> BackendCapability {
        BackendCapability {
            native_available: self.native_backend,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
