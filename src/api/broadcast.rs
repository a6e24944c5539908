//! Broadcast endpoint
//!
//! GET  /broadcast - Current active message, or null
//! POST /broadcast - Replace the active message (admin only)

use axum::{
    body::Bytes,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderName, Method},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{cors, method_not_allowed, parse_body, ApiError, AppState};
use crate::auth::ADMIN_KEY_HEADER;
use crate::broadcast::{BroadcastMessage, MessageText};

/// Build the broadcast router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/broadcast",
            get(get_active)
                .post(publish)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route_layer(cors(
            [Method::GET, Method::POST, Method::OPTIONS],
            [
                header::CONTENT_TYPE,
                HeaderName::from_static(ADMIN_KEY_HEADER),
            ],
        ))
}

/// Extractor that rejects requests the configured `Authorizer` does not accept
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.authorizer.is_admin(&parts.headers) {
            Ok(AdminAuth)
        } else {
            debug!("Rejected broadcast publish: bad or missing admin key");
            Err(ApiError::Unauthorized)
        }
    }
}

/// GET response
#[derive(Debug, Serialize)]
pub struct ActiveResponse {
    pub message: Option<BroadcastMessage>,
}

/// POST response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Return the active message
async fn get_active(State(state): State<AppState>) -> Result<Json<ActiveResponse>, ApiError> {
    let message = state.broadcasts.active().await?;
    Ok(Json(ActiveResponse { message }))
}

/// Publish a new active message
///
/// Auth is checked before the body is read; nothing touches the store
/// unless both auth and validation pass.
async fn publish(
    State(state): State<AppState>,
    _admin: AdminAuth,
    body: Bytes,
) -> Result<Json<PublishResponse>, ApiError> {
    let body = parse_body(&body)?;
    let text = body
        .get("message")
        .and_then(|v| v.as_str())
        .and_then(|s| MessageText::new(s).ok())
        .ok_or(ApiError::Validation("Message is required"))?;

    let published = state.broadcasts.publish(&text).await?;

    Ok(Json(PublishResponse {
        success: true,
        id: published.id,
        message: published.message,
        created_at: published.created_at,
    }))
}
