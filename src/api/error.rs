//! API error type and JSON error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::broadcast::BroadcastError;
use crate::imagegen::ImageError;

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("store failure: {0}")]
    Store(#[from] BroadcastError),

    #[error("upstream failure: {0}")]
    Upstream(#[from] ImageError),
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(ImageError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(ImageError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-facing message; internal details stay in the logs
    fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "Internal server error".to_string(),
            ApiError::Upstream(ImageError::NotConfigured) => {
                "Image generation not configured".to_string()
            }
            ApiError::Upstream(ImageError::Timeout) => "Image generation timed out".to_string(),
            ApiError::Upstream(_) => "Image generation failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => warn!("Broadcast store error: {}", e),
            ApiError::Upstream(e) => warn!("Image generation error: {}", e),
            _ => {}
        }

        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
