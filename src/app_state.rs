// =============================================================================
// Application State — shared across HTTP handlers
// =============================================================================
//
// The engine itself is stateless; the only shared mutable data lives here:
// calculation counters and a short ring of recent failures for the health
// endpoint.
//
// Thread safety:
//   - Atomic counter for request sequencing.
//   - parking_lot::RwLock for the counters and the error ring.
//   - The Dispatcher is immutable after construction.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::dispatcher::Dispatcher;
use crate::error::ErrorKind;
use crate::formatter::IndicatorResponse;
use crate::indicators::BackendKind;
use crate::runtime_config::EngineConfig;

/// Maximum number of recent failures to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// A rejected request, as shown on the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub indicator: String,
    pub kind: ErrorKind,
    /// ISO 8601 timestamp.
    pub at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CalculationStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Successful calculations per indicator name.
    pub by_indicator: BTreeMap<String, u64>,
    pub recent_errors: Vec<ErrorRecord>,
}

/// Payload of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: BackendKind,
    pub uptime_secs: u64,
    pub server_time: i64,
    pub requests: u64,
    pub calculations: CalculationStats,
}

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: EngineConfig,
    pub stats: RwLock<CalculationStats>,

    /// Monotonic request sequence, used in log lines.
    pub request_counter: AtomicU64,

    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.backend_capability()),
            config,
            stats: RwLock::new(CalculationStats::default()),
            request_counter: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn next_request_seq(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count one finished calculation request.
    pub fn record(&self, indicator: &str, response: &IndicatorResponse) {
        let mut stats = self.stats.write();
        stats.total += 1;

        match response.error_kind() {
            None => {
                stats.succeeded += 1;
                *stats
                    .by_indicator
                    .entry(indicator.trim().to_ascii_lowercase())
                    .or_insert(0) += 1;
            }
            Some(kind) => {
                stats.failed += 1;
                stats.recent_errors.push(ErrorRecord {
                    indicator: indicator.to_string(),
                    kind,
                    at: Utc::now().to_rfc3339(),
                });
                while stats.recent_errors.len() > MAX_RECENT_ERRORS {
                    stats.recent_errors.remove(0);
                }
            }
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            backend: self.dispatcher.backend_kind(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            server_time: Utc::now().timestamp_millis(),
            requests: self.request_counter.load(Ordering::Relaxed),
            calculations: self.stats.read().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::IndicatorRequest;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(EngineConfig {
            native_backend: false,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn backend_follows_config() {
        assert_eq!(state().dispatcher.backend_kind(), BackendKind::Fallback);
        assert_eq!(
            AppState::new(EngineConfig::default()).health().backend,
            BackendKind::Primary
        );
    }

    #[test]
    fn record_counts_outcomes() {
        let state = state();
        let ok = IndicatorRequest::new("SMA", json!([{ "time": 1, "close": 1 }]), json!({}));
        let bad = IndicatorRequest::new("nope", json!([]), json!({}));

        state.record("SMA", &state.dispatcher.respond(&ok));
        state.record("nope", &state.dispatcher.respond(&bad));

        let health = state.health();
        assert_eq!(health.calculations.total, 2);
        assert_eq!(health.calculations.succeeded, 1);
        assert_eq!(health.calculations.failed, 1);
        assert_eq!(health.calculations.by_indicator.get("sma"), Some(&1));
        assert_eq!(
            health.calculations.recent_errors[0].kind,
            ErrorKind::UnknownIndicator
        );
    }

    #[test]
    fn error_ring_is_capped() {
        let state = state();
        let bad = IndicatorRequest::new("nope", json!([]), json!({}));
        let response = state.dispatcher.respond(&bad);
        for _ in 0..(MAX_RECENT_ERRORS + 10) {
            state.record("nope", &response);
        }
        assert_eq!(state.stats.read().recent_errors.len(), MAX_RECENT_ERRORS);
    }

    #[test]
    fn request_sequence_increments() {
        let state = state();
        assert_eq!(state.next_request_seq(), 1);
        assert_eq!(state.next_request_seq(), 2);
        assert_eq!(state.health().requests, 2);
    }
}
