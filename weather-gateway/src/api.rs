use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use weather_core::{Status, WeatherRpc, WeatherSnapshot};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct AppState {
    pub rpc: Arc<dyn WeatherRpc>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/weather/current", get(current))
        .route("/api/weather/history", get(history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// A failed gateway request: HTTP status plus a `detail` body, the RPC
/// status embedded as `<CODE>: <message>`.
struct GatewayError {
    http: StatusCode,
    detail: String,
}

impl GatewayError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            http: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<Status> for GatewayError {
    fn from(status: Status) -> Self {
        Self {
            http: StatusCode::from_u16(status.code.http_status())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            detail: status.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.http, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentParams {
    city: String,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    city: String,
    from_ms: Option<i64>,
    to_ms: Option<i64>,
}

async fn current(
    State(state): State<AppState>,
    Query(params): Query<CurrentParams>,
) -> Result<Json<WeatherSnapshot>, GatewayError> {
    let snapshot = state.rpc.get_current_weather(&params.city).await?;
    Ok(Json(snapshot))
}

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<WeatherSnapshot>>, GatewayError> {
    let now_ms = Utc::now().timestamp_millis();
    let (from_ms, to_ms) = resolve_range(params.from_ms, params.to_ms, now_ms);

    if from_ms <= 0 || to_ms <= 0 || from_ms >= to_ms {
        return Err(GatewayError::bad_request("Invalid time range"));
    }

    let series = state
        .rpc
        .get_weather_history(&params.city, from_ms, to_ms)
        .await?;
    Ok(Json(series))
}

/// Fill in missing range bounds: `to_ms` defaults to now, `from_ms` to 24
/// hours before `to_ms`, so an unqualified query covers exactly the
/// trailing day `[now - 86_400_000, now)`.
pub fn resolve_range(from_ms: Option<i64>, to_ms: Option<i64>, now_ms: i64) -> (i64, i64) {
    let to_ms = to_ms.unwrap_or(now_ms);
    let from_ms = from_ms.unwrap_or(to_ms - DAY_MS);
    (from_ms, to_ms)
}
