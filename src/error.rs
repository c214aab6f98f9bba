//! Error types for the price service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::ErrorResponse;

// == Field Error ==
/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Name of the offending field, as it appears in the request
    pub field: String,
    /// Human readable reason
    pub message: String,
    /// The value that was rejected, if any
    pub rejected_value: serde_json::Value,
}

impl FieldError {
    /// Creates a new FieldError
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        rejected_value: serde_json::Value,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rejected_value,
        }
    }
}

// == Price Error Enum ==
/// Unified error type for the price service.
#[derive(Error, Debug)]
pub enum PriceError {
    /// Cache constructed without any key extractor
    #[error("No indexes configured: at least one key extractor is required")]
    NoIndexesConfigured,

    /// Index ordinal outside the configured range
    #[error("Invalid index ordinal {ordinal}: {configured} indexes configured")]
    InvalidIndexOrdinal { ordinal: usize, configured: usize },

    /// Request failed field validation
    #[error("Invalid request: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Malformed inbound CSV data
    #[error("CSV parse error: {0}")]
    Csv(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// == IntoResponse Implementation ==
impl IntoResponse for PriceError {
    fn into_response(self) -> Response {
        match self {
            PriceError::Validation(field_errors) => {
                let body = Json(json!({
                    "fieldErrors": field_errors
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            other => {
                let status = match &other {
                    PriceError::Csv(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(ErrorResponse::new(other.to_string()))).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the price service.
pub type Result<T> = std::result::Result<T, PriceError>;
