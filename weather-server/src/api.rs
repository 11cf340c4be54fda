use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use weather_core::rpc::{
    API_KEY_HEADER, GET_CURRENT_PATH, GET_HISTORY_PATH, GetCurrentWeatherRequest,
    GetCurrentWeatherResponse, GetWeatherHistoryRequest, GetWeatherHistoryResponse,
};
use weather_core::{Status, WeatherService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub service_api_key: Arc<String>,
}

/// Build the RPC router. The auth gate is layered over the two RPC routes
/// only; `/health` stays unauthenticated.
pub fn app(state: AppState) -> Router {
    let rpc = Router::new()
        .route(GET_CURRENT_PATH, post(get_current_weather))
        .route(GET_HISTORY_PATH, post(get_weather_history))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(rpc)
        .with_state(state)
}

/// An aborted call: the `Status` serialized as the response body. The HTTP
/// status is derived from the code, but callers re-map from the body, so
/// the body is the contract.
struct Abort(Status);

impl From<Status> for Abort {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl IntoResponse for Abort {
    fn into_response(self) -> Response {
        let http = StatusCode::from_u16(self.0.code.http_status())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        (http, Json(self.0)).into_response()
    }
}

/// Auth gate: exact, case-sensitive comparison of the `x-api-key` header
/// against the configured secret. Absent or mismatched → UNAUTHENTICATED,
/// and the handler is never reached.
async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented != Some(state.service_api_key.as_str()) {
        return Abort(Status::unauthenticated("Invalid x-api-key")).into_response();
    }

    next.run(request).await
}

async fn get_current_weather(
    State(state): State<AppState>,
    Json(request): Json<GetCurrentWeatherRequest>,
) -> Result<Json<GetCurrentWeatherResponse>, Abort> {
    let snapshot = state.service.get_current_weather(&request.city).await?;
    Ok(Json(GetCurrentWeatherResponse { snapshot }))
}

async fn get_weather_history(
    State(state): State<AppState>,
    Json(request): Json<GetWeatherHistoryRequest>,
) -> Result<Json<GetWeatherHistoryResponse>, Abort> {
    let series = state
        .service
        .get_weather_history(&request.city, request.from_ms, request.to_ms)
        .await?;
    Ok(Json(GetWeatherHistoryResponse { series }))
}
