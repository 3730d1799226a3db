//! Wire types for the `/api/v1` HTTP transport.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    #[must_use]
    pub fn from_error(e: &noetic_common::Error) -> Self {
        Self { error: e.to_string(), code: Some(error_code(e)), timestamp: Utc::now() }
    }
}

fn error_code(e: &noetic_common::Error) -> String {
    match e {
        noetic_common::Error::InvalidInput(_) => "INVALID_INPUT",
        noetic_common::Error::NotFound(_) => "NOT_FOUND",
        noetic_common::Error::Unauthorized(_) => "UNAUTHORIZED",
        noetic_common::Error::RateLimited(_) => "RATE_LIMITED",
        noetic_common::Error::FetchFailure(_) => "FETCH_FAILURE",
        noetic_common::Error::StoreFailure(_) => "STORE_FAILURE",
        noetic_common::Error::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
        noetic_common::Error::Cancelled => "CANCELLED",
        _ => "INTERNAL_ERROR",
    }
    .to_string()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
