use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Machine-readable codes carried in error bodies
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum ErrorCode {
    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,
    #[serde(rename = "DB_7002")]
    QueryFailed,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 3001,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::QueryFailed => 7002,
        }
    }
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    pub details: Option<String>,
}

/// Failures that escape the publish handler as non-envelope responses.
///
/// Payload-level refusals (`_type`, coordinates, identity) are answered with the
/// publish envelope instead; see `models::PublishRejection`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The body could not be read as JSON at all.
    #[error("{message}")]
    UnreadableBody {
        code: ErrorCode,
        message: &'static str,
        details: Option<String>,
    },
}

impl ApiError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Database(_) => ErrorCode::QueryFailed,
            ApiError::UnreadableBody { code, .. } => *code,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnreadableBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let code = self.error_code();
        let (message, details) = match self {
            // Driver messages stay in the logs
            ApiError::Database(_) => ("Failed to store location".to_string(), None),
            ApiError::UnreadableBody {
                message, details, ..
            } => (message.to_string(), details.clone()),
        };

        ErrorDetail {
            code,
            code_number: code.code(),
            message,
            details,
        }
    }

    fn log_error(&self, request_id: &str) {
        if self.status_code().is_server_error() {
            error!(request_id = %request_id, error = %self, "Server error occurred");
        } else {
            warn!(request_id = %request_id, error = %self, "Client error occurred");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let error_response = ErrorResponse {
            success: false,
            error: self.detail(),
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (self.status_code(), Json(error_response)).into_response()
    }
}

/// Convert an axum JSON extraction failure into a structured 400
pub fn handle_rejection(err: JsonRejection) -> ApiError {
    let (code, message) = match &err {
        JsonRejection::JsonSyntaxError(_) => (ErrorCode::InvalidFormat, "Invalid JSON format"),
        JsonRejection::MissingJsonContentType(_) => {
            (ErrorCode::InvalidFormat, "JSON content type required")
        }
        _ => (ErrorCode::InvalidInput, "Invalid request body"),
    };

    ApiError::UnreadableBody {
        code,
        message,
        details: Some(err.body_text()),
    }
}
