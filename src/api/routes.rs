use crate::api::response::{ApiResponse, ApiResult};
use crate::api::service::{
    self, BulkSlotsRequest, DateStatusPayload, OpenNowPayload, SlotsPayload,
};
use crate::core::availability::AvailabilityEngine;
use crate::core::loader::LoadedRules;
use crate::domain::model::SlotCheck;
use crate::domain::ports::SharedStore;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AvailabilityEngine<SharedStore>>,
    pub restaurant: Arc<str>,
}

impl AppState {
    pub fn new(engine: AvailabilityEngine<SharedStore>, restaurant: impl Into<Arc<str>>) -> Self {
        Self {
            engine: Arc::new(engine),
            restaurant: restaurant.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
    pub now: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateQuery {
    pub date: Option<String>,
    pub time: Option<String>,
    pub now: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    pub now: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub restaurant: String,
    pub timezone: String,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        restaurant: state.restaurant.to_string(),
        timezone: state.engine.timezone().name().to_string(),
    })
}

/// GET /api/hours
async fn hours(State(state): State<AppState>) -> ApiResponse<LoadedRules> {
    ApiResponse::ok(service::hours(state.engine.as_ref()).await)
}

/// GET /api/slots?date=YYYY-MM-DD
async fn slots(State(state): State<AppState>, Query(q): Query<DateQuery>) -> ApiResult<SlotsPayload> {
    let payload = service::slots(state.engine.as_ref(), q.date.as_deref(), q.now.as_deref()).await?;
    Ok(ApiResponse::ok(payload))
}

/// GET /api/validate?date=YYYY-MM-DD&time=HH:MM
async fn validate(
    State(state): State<AppState>,
    Query(q): Query<ValidateQuery>,
) -> ApiResult<SlotCheck> {
    let check = service::validate(
        state.engine.as_ref(),
        q.date.as_deref(),
        q.time.as_deref(),
        q.now.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(check))
}

async fn date_status(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> ApiResult<DateStatusPayload> {
    let payload = service::date_status(state.engine.as_ref(), q.date.as_deref(), q.now.as_deref()).await?;
    Ok(ApiResponse::ok(payload))
}

async fn open_now(State(state): State<AppState>, Query(q): Query<NowQuery>) -> ApiResult<OpenNowPayload> {
    Ok(ApiResponse::ok(service::open_now(state.engine.as_ref(), q.now.as_deref()).await?))
}

/// POST /api/slots/bulk
async fn bulk_slots(
    State(state): State<AppState>,
    Json(request): Json<BulkSlotsRequest>,
) -> ApiResult<Vec<SlotsPayload>> {
    Ok(ApiResponse::ok(service::bulk_slots(state.engine.as_ref(), &request).await?))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/hours", get(hours))
        .route("/slots", get(slots))
        .route("/slots/bulk", post(bulk_slots))
        .route("/validate", get(validate))
        .route("/date-status", get(date_status))
        .route("/open-now", get(open_now))
}

/// CORS for browser booking forms. `None` allows any origin.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    match origins {
        Some(origins) if !origins.is_empty() => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring unparsable CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
        _ => layer.allow_origin(Any),
    }
}

/// Full application router with the middleware stack.
pub fn build_router(state: AppState, request_timeout: Duration, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
