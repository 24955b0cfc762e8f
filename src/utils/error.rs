//! Error types and handling
//!
//! Request errors are converted into the JSON bodies that front-end
//! consumers of the audit log endpoint already expect.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::utils::validation::InvalidParameter;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// A query parameter failed validation (400)
    #[error("{0}")]
    InvalidParameter(#[from] InvalidParameter),

    /// The audit log store could not serve the query (500)
    #[error("Failed to retrieve audit logs: {0}")]
    StoreUnavailable(String),
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Present only on server errors, always `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Short error description
    pub error: String,
    /// Best-effort diagnostic text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: None,
            error: error.into(),
            message: None,
        }
    }

    /// Mark the response as a failed operation and attach a message
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.success = Some(false);
        self.message = Some(message.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidParameter(invalid) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(invalid.to_string()),
            ),
            AppError::StoreUnavailable(message) => {
                error!(error = %self, "Request error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Failed to retrieve audit logs").failed(message.clone()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
