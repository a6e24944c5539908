//! Image generation endpoint
//!
//! POST /generate-image - Forward a prompt upstream and return the image URL

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::{cors, method_not_allowed, parse_body, ApiError, AppState};

/// Build the images router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/generate-image",
            post(generate_image).fallback(method_not_allowed),
        )
        .route_layer(cors([Method::POST, Method::OPTIONS], [header::CONTENT_TYPE]))
}

/// Generation response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub image_url: String,
    pub prompt: String,
}

async fn generate_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let body = parse_body(&body)?;
    let prompt = body
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::Validation("Prompt is required"))?;

    let image_url = state.images.generate(prompt).await?;
    info!("Generated image for prompt ({} chars)", prompt.len());

    Ok(Json(GenerateResponse {
        success: true,
        image_url,
        prompt: prompt.to_string(),
    }))
}
