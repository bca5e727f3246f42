use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::coordination::CoordinationError;

/// API error type with HTTP status code and message
///
/// Serialized as `{"error": message}` plus any extra fields.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Map<String, Value>,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Adds an extra field to the error body
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = self.fields;
        body.insert("error".to_string(), json!(self.message));

        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<CoordinationError> for ApiError {
    fn from(error: CoordinationError) -> Self {
        match error {
            CoordinationError::MissingField(_) => Self::bad_request(error.to_string()),
            CoordinationError::AlreadyClaimed { holder, claimed_at } => {
                Self::conflict("Task already claimed")
                    .with_field("claimed_by", holder)
                    .with_field("claimed_at", claimed_at.to_rfc3339())
            }
            CoordinationError::NotClaimed => Self::not_found(error.to_string()),
            CoordinationError::NotLeaseHolder { ref holder } => Self::conflict(error.to_string())
                .with_field("claimed_by", holder.clone()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
