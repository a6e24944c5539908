//! HTTP API module - broadcast and image generation endpoints

mod broadcast;
mod error;
mod images;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::Authorizer;
use crate::broadcast::BroadcastStore;
use crate::db::Database;
use crate::imagegen::ImageClient;
pub use error::{ApiError, ErrorResponse};

/// Preflight responses may be cached this long
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub broadcasts: BroadcastStore,
    pub authorizer: Arc<dyn Authorizer>,
    pub images: Arc<ImageClient>,
}

impl AppState {
    pub fn new(db: Arc<Database>, authorizer: Arc<dyn Authorizer>, images: ImageClient) -> Self {
        Self {
            broadcasts: BroadcastStore::new(db.pool().clone()),
            db,
            authorizer,
            images: Arc::new(images),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(broadcast::router())
        .merge(images::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for one endpoint
///
/// Answers every OPTIONS request itself and adds `Access-Control-Allow-Origin: *`
/// to all other responses, errors included.
fn cors<const M: usize, const H: usize>(
    methods: [Method; M],
    headers: [HeaderName; H],
) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::list(headers))
        .max_age(PREFLIGHT_MAX_AGE)
}

/// Fallback for verbs an endpoint does not serve
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Parse a request body as JSON, treating an empty body as `{}`
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::Validation("Invalid JSON body"))
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "beacond",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}
