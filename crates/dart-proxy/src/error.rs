//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dart::DartError;
use serde_json::json;
use tracing::{error, warn};

/// A [`DartError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DartError);

impl From<DartError> for ApiError {
    fn from(e: DartError) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    ///
    /// - InvalidInput: 400
    /// - Unauthenticated: 401, Unauthorized: 403
    /// - NotFound: 404
    /// - Upstream, Network, Parse, CorruptManifest: 502
    /// - Config: 500
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.0 {
            DartError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DartError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            DartError::Unauthorized(_) => StatusCode::FORBIDDEN,
            DartError::NotFound(_) => StatusCode::NOT_FOUND,
            DartError::Upstream { .. }
            | DartError::Network(_)
            | DartError::Parse(_)
            | DartError::CorruptManifest(_) => StatusCode::BAD_GATEWAY,
            DartError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            if status == StatusCode::BAD_GATEWAY {
                warn!(error = %self.0, "Upstream failure");
            } else {
                error!(error = %self.0, "Request failed");
            }
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
