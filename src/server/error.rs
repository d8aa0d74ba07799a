//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`medialog_common::Error`] so that route
//! handlers can return `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: medialog_common::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: medialog_common::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<medialog_common::Error> for AppError {
    fn from(e: medialog_common::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Only validation failures are worth echoing verbatim.
        let message = if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = ?self.request_id,
                "Server error in API handler"
            );
            "Internal server error".to_string()
        } else {
            self.inner.to_string()
        };

        let mut body = json!({
            "error": message,
            "code": self.inner.code(),
        });
        if let Some(id) = self.request_id {
            body["request_id"] = json!(id);
        }

        (status, axum::Json(body)).into_response()
    }
}
