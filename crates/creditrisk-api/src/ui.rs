//! Embedded browser form for interactive scoring

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_embed::Embed;
use serde_json::json;
use tracing::error;

#[derive(Embed)]
#[folder = "web"]
struct UiAssets;

/// Serve the embedded scoring form
pub async fn serve_ui() -> Response {
    serve_asset("index.html")
}

fn serve_asset(path: &str) -> Response {
    match <UiAssets as Embed>::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            error!("UI asset not found: {}", path);
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "user interface not found",
                    "detail": format!("missing asset {}", path),
                })),
            )
                .into_response()
        }
    }
}
