//! Error handling for the FishCast server
//!
//! Every failure leaves the server as a JSON `{error: {code, message, field?}}`
//! body with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fishcast_engine::EngineError;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    // External service errors
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        let detail = |code: &str, message: String, field: Option<String>| ErrorDetail {
            code: code.to_string(),
            message,
            field,
        };
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                detail("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                detail("VALIDATION_ERROR", msg.clone(), None),
            ),
            AppError::UnknownSpecies(key) => (
                StatusCode::BAD_REQUEST,
                detail(
                    "UNKNOWN_SPECIES",
                    format!("Unknown species: {}", key),
                    Some("species".to_string()),
                ),
            ),
            AppError::WeatherServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                detail(
                    "WEATHER_SERVICE_UNAVAILABLE",
                    "Weather service is temporarily unavailable".to_string(),
                    None,
                ),
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                detail(
                    "EXTERNAL_SERVICE_ERROR",
                    format!("External service error: {}", msg),
                    None,
                ),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    None,
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("INTERNAL_ERROR", msg.clone(), None),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                ),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownSpecies(key) => AppError::UnknownSpecies(key),
            EngineError::UnknownWaterBody(key) => AppError::Validation {
                field: "water_body".to_string(),
                message: format!("Unknown water body type: {}", key),
            },
            EngineError::InvalidSnapshot(reason) => {
                AppError::ValidationError(format!("Invalid weather snapshot: {}", reason))
            }
            EngineError::InvalidDate(value) => AppError::Validation {
                field: "date".to_string(),
                message: format!("Invalid date: {}", value),
            },
            EngineError::Store(msg) => AppError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        match field_errors.iter().next() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is out of range", field));
                AppError::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_client_errors() {
        let (status, detail) =
            AppError::from(EngineError::UnknownSpecies("walleye".to_string())).status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "UNKNOWN_SPECIES");
        assert_eq!(detail.field.as_deref(), Some("species"));

        let (status, _) = AppError::from(EngineError::InvalidSnapshot("hourly series length mismatch"))
            .status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_errors_are_gateway_errors() {
        let (status, detail) =
            AppError::ExternalService("timeout".to_string()).status_and_detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(detail.message.contains("timeout"));
    }
}
