//! Error handling for the Dlist server API
//!
//! Every handler failure becomes a JSON body with an `error` message. The
//! message is chosen per endpoint; the underlying cause is only logged,
//! except for the diagnostic poem listing which also returns it as `detail`.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use tracing::error;

use dlist_kb::CoreError;

/// API Error type for returning standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Not found (404)
    NotFound(String),
    /// Internal server error (500)
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    /// Maps a core failure to a response, using `message` for server errors.
    pub fn from_core(err: CoreError, message: &str) -> Self {
        match err {
            CoreError::InvalidInput(reason) => ApiError::BadRequest(reason),
            CoreError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{} not found", entity_type))
            }
            other => {
                error!("{}: {}", message, other);
                ApiError::internal(message)
            }
        }
    }

    /// Like [`ApiError::from_core`] but server errors carry the cause.
    pub fn with_detail(err: CoreError, message: &str) -> Self {
        let detail = err.to_string();
        match Self::from_core(err, message) {
            ApiError::InternalServerError { message, .. } => ApiError::InternalServerError {
                message,
                detail: Some(detail),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServerError { message, .. } => {
                write!(f, "Internal Server Error: {}", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let (error_code, message, detail) = match self {
            ApiError::BadRequest(msg) => ("ERR_BAD_REQUEST", msg, None),
            ApiError::NotFound(msg) => ("ERR_NOT_FOUND", msg, None),
            ApiError::InternalServerError { message, detail } => {
                ("ERR_INTERNAL_SERVER_ERROR", message, detail)
            }
        };

        let mut body = Map::new();
        body.insert("error".to_string(), json!(message));
        if let Some(detail) = detail {
            body.insert("detail".to_string(), json!(detail));
        }
        body.insert(
            "errorDetails".to_string(),
            json!({
                "errorCode": error_code,
                "errorMessage": message,
            }),
        );

        (status, Json(Value::Object(body))).into_response()
    }
}
