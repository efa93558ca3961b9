// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/`. None require authentication; the service
// only computes indicators over data the caller already holds.
//
// CORS is permissive so that chart front-ends on any origin can call it.
// Calculations run on the blocking pool so a large series never stalls the
// async runtime.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::api::SpecEnvelope;
use crate::app_state::AppState;
use crate::dispatcher::{Dispatcher, IndicatorRequest};
use crate::error::ErrorKind;
use crate::formatter::{FailureEnvelope, IndicatorResponse};
use crate::registry::IndicatorSpec;
use crate::types::{ChartType, DisplayType};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/api/health", get(health))
        .route("/api/indicator/list", get(list))
        .route("/api/indicator/metadata", get(metadata_all))
        .route("/api/indicator/metadata/:name", get(metadata_one))
        .route("/api/indicator/calculate", post(calculate))
        // ── Middleware & State ───────────────────────────────────────
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// HTTP status for an engine outcome.
pub fn status_for(response: &IndicatorResponse) -> StatusCode {
    match response.error_kind() {
        None => StatusCode::OK,
        Some(ErrorKind::UnknownIndicator) => StatusCode::NOT_FOUND,
        Some(ErrorKind::InvalidInput | ErrorKind::InvalidParameters) => StatusCode::BAD_REQUEST,
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health())
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEntry {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    display_type: DisplayType,
    chart_type: ChartType,
}

impl From<&'static IndicatorSpec> for ListEntry {
    fn from(spec: &'static IndicatorSpec) -> Self {
        Self {
            name: spec.name,
            display_name: spec.display_name,
            description: spec.description,
            display_type: spec.display_type,
            chart_type: spec.chart_type,
        }
    }
}

#[derive(Serialize)]
struct CatalogResponse<T> {
    success: bool,
    data: Vec<T>,
    count: usize,
}

impl<T> CatalogResponse<T> {
    fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

async fn list() -> impl IntoResponse {
    let entries: Vec<ListEntry> = Dispatcher::catalog().into_iter().map(ListEntry::from).collect();
    Json(CatalogResponse::new(entries))
}

async fn metadata_all() -> impl IntoResponse {
    Json(CatalogResponse::new(Dispatcher::catalog()))
}

async fn metadata_one(Path(name): Path<String>) -> Response {
    match Dispatcher::spec(&name) {
        Ok(spec) => Json(SpecEnvelope::new(spec)).into_response(),
        Err(err) => (
            StatusCode::NOT_FOUND,
            Json(FailureEnvelope::from_error(&err, Some(&name))),
        )
            .into_response(),
    }
}

// =============================================================================
// Calculate
// =============================================================================

async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndicatorRequest>,
) -> Response {
    let seq = state.next_request_seq();
    let request_id = uuid::Uuid::new_v4();
    let indicator = request.indicator_name.clone();
    debug!(%request_id, seq, indicator = %indicator, "calculate request received");

    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.dispatcher.respond(&request)).await;

    match outcome {
        Ok(response) => {
            state.record(&indicator, &response);
            let status = status_for(&response);
            info!(
                %request_id,
                seq,
                indicator = %indicator,
                status = status.as_u16(),
                "calculate request finished"
            );
            (status, Json(response)).into_response()
        }
        Err(e) => {
            error!(%request_id, seq, error = %e, "calculation task failed");
            let body = serde_json::json!({
                "success": false,
                "error": { "kind": "Internal", "message": "calculation task failed" },
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::EngineConfig;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(EngineConfig::default()));
        (router(state.clone()), state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn candles(closes: &[f64]) -> Value {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                json!({
                    "time": 1_000 + i as i64 * 60,
                    "open": c,
                    "high": c,
                    "low": c,
                    "close": c,
                    "volume": 1
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let (app, _) = app();
        let (status, body) = send(app, get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "primary");
    }

    #[tokio::test]
    async fn list_and_metadata() {
        let (app, _) = app();
        let (status, body) = send(app.clone(), get_req("/api/indicator/list")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 7);
        assert_eq!(body["data"][0]["name"], "sma");
        assert!(body["data"][0].get("parameters").is_none());

        let (_, body) = send(app.clone(), get_req("/api/indicator/metadata")).await;
        assert_eq!(body["data"][3]["name"], "macd");
        assert!(body["data"][3]["parameters"].is_array());

        let (status, body) = send(app.clone(), get_req("/api/indicator/metadata/rsi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["name"], "rsi");
        assert_eq!(body["displayType"], "single-line");

        let (status, body) = send(app, get_req("/api/indicator/metadata/ichimoku")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "UnknownIndicator");
    }

    #[tokio::test]
    async fn calculate_success() {
        let (app, state) = app();
        let req = post_json(
            "/api/indicator/calculate",
            json!({
                "indicatorName": "sma",
                "candles": candles(&[1.0, 2.0, 3.0, 4.0, 5.0]),
                "parameters": { "period": 3 }
            }),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let values: Vec<f64> = body["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["value"].as_f64().unwrap())
            .collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(body["values"][0]["time"], 1_120);
        assert_eq!(state.stats.read().succeeded, 1);
    }

    #[tokio::test]
    async fn calculate_failure_status_codes() {
        let (app, state) = app();

        let unknown = post_json(
            "/api/indicator/calculate",
            json!({ "indicator": "ichimoku", "candleData": candles(&[1.0]) }),
        );
        let (status, body) = send(app.clone(), unknown).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "UnknownIndicator");

        let empty = post_json(
            "/api/indicator/calculate",
            json!({ "indicatorName": "ema", "candles": [] }),
        );
        let (status, body) = send(app.clone(), empty).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "InvalidInput");

        let params = post_json(
            "/api/indicator/calculate",
            json!({
                "indicatorName": "macd",
                "candles": candles(&[1.0, 2.0]),
                "params": { "fastPeriod": 30, "slowPeriod": 10 }
            }),
        );
        let (status, body) = send(app, params).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "InvalidParameters");

        assert_eq!(state.stats.read().failed, 3);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (app, _) = app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/indicator/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
