// Gateway error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::request::RequestError;
use crate::api::response::KoResponse;
use crate::database::DatabaseError;

/// Gateway failure with the envelope and status code it is reported with
#[derive(Debug)]
pub enum ApiError {
    // Request data could not be extracted
    NoData,
    Unparseable,

    // resultcode 400
    MissingParameters(String),

    // resultcode 401
    WrongGuid(String),

    InvalidEvent(String),

    // resultcode 402, also for lookups the backend failed to answer
    LocatorNotFound(String),
}

impl ApiError {
    /// Get HTTP status code; every gateway failure is a 400
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Get the `resultcode` carried by ko envelopes
    pub fn result_code(&self) -> Option<u16> {
        match self {
            ApiError::MissingParameters(_) => Some(400),
            ApiError::WrongGuid(_) => Some(401),
            ApiError::LocatorNotFound(_) => Some(402),
            ApiError::NoData | ApiError::Unparseable | ApiError::InvalidEvent(_) => None,
        }
    }

    /// Get client-facing message
    pub fn message(&self) -> String {
        match self {
            ApiError::NoData => RequestError::NoData.to_string(),
            ApiError::Unparseable => RequestError::Unparseable.to_string(),
            ApiError::MissingParameters(data) => format!("Missing parameters:{}", data),
            ApiError::WrongGuid(guid) => format!("Wrong guid:{}", guid),
            ApiError::InvalidEvent(_) => "invalid event".to_string(),
            ApiError::LocatorNotFound(guid) => format!("Locator not found:{}", guid),
        }
    }

    /// Convert to response body: a ko envelope, or `{"response": ..}` for
    /// failures that happen before an event is dispatched
    pub fn to_json(&self) -> Value {
        match self.result_code() {
            Some(code) => json!(KoResponse::new(self.message(), code)),
            None => json!({ "response": self.message() }),
        }
    }

    /// Map a lookup failure for `guid`. Backend errors are logged but reach
    /// the client as an unresolved locator.
    pub fn from_lookup(err: DatabaseError, guid: &str) -> Self {
        if !err.is_not_found() {
            // Don't expose internal SQL errors to clients
            tracing::error!("Lookup of {} failed in the backend: {}", guid, err);
        }
        ApiError::LocatorNotFound(guid.to_string())
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NoData => ApiError::NoData,
            RequestError::Unparseable => ApiError::Unparseable,
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// JSON rendering; format-aware replies go through `api::render`
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
