use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::scrape::ScrapeError;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Converts our `HTTPError` into a JSON response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Upstream failures are a temporary unavailability; anything else is ours.
impl From<ScrapeError> for HTTPError {
    fn from(error: ScrapeError) -> Self {
        let status = match error {
            ScrapeError::Fetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScrapeError::Emit(_) | ScrapeError::Exposition(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        HTTPError::new(status, error.to_string())
    }
}
