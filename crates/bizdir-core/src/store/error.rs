use std::time::Duration;

use thiserror::Error;

use crate::utils::truncate;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - API key or session may be invalid")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Read of {collection} timed out after {after:?}")]
    Timeout { collection: String, after: Duration },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl StoreError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.chars().count() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{} (truncated, {} total bytes)",
                truncate(body, MAX_ERROR_BODY_LENGTH),
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => StoreError::Unauthorized,
            403 => StoreError::AccessDenied(truncated),
            404 => StoreError::NotFound(truncated),
            429 => StoreError::RateLimited,
            500..=599 => StoreError::ServerError(truncated),
            _ => StoreError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(StoreError::from_status(StatusCode::UNAUTHORIZED, ""), StoreError::Unauthorized));
        assert!(matches!(StoreError::from_status(StatusCode::FORBIDDEN, "no"), StoreError::AccessDenied(_)));
        assert!(matches!(StoreError::from_status(StatusCode::NOT_FOUND, "gone"), StoreError::NotFound(_)));
        assert!(matches!(StoreError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), StoreError::RateLimited));
        assert!(matches!(StoreError::from_status(StatusCode::BAD_GATEWAY, ""), StoreError::ServerError(_)));
        assert!(matches!(StoreError::from_status(StatusCode::BAD_REQUEST, ""), StoreError::InvalidResponse(_)));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        match StoreError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            StoreError::ServerError(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.contains("2000 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
