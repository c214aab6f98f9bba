//! Response DTOs for the price service API
//!
//! Defines the structure of outgoing HTTP response bodies other than prices,
//! which are serialized directly.

use serde::Serialize;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Number of prices currently cached
    pub prices: usize,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(prices: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            prices,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for non-validation error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
