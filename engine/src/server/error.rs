//! Error type mapping `SageError` to HTTP status codes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use sdk::{SageError, SageErrorExt};

#[derive(Debug)]
pub struct ApiError(pub SageError);

impl From<SageError> for ApiError {
    fn from(e: SageError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SageError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SageError::Configuration(_) => StatusCode::BAD_REQUEST,
            SageError::SessionBusy => StatusCode::CONFLICT,
            SageError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            SageError::Tool(_) | SageError::Network(_) => StatusCode::BAD_GATEWAY,
            SageError::AgentExecution(_) | SageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (
            status,
            Json(json!({
                "error": self.0.to_string(),
                "hint": self.0.user_hint(),
            })),
        )
            .into_response()
    }
}
