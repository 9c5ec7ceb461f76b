//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response. The
/// underlying cause is logged but never surfaced to the caller.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        // Respond with a generic error payload
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": "Failed" })),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}
