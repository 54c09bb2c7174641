//! Error types for recitation verification

use thiserror::Error;

/// Errors from the remote verifier and its key storage
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No API key stored
    #[error("Gemini API key not configured. Run `hafalan verifier-setup <key>`")]
    ApiKeyNotFound,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// Key does not look like a Google API key
    #[error("Invalid API key format. Key should start with 'AIza'")]
    InvalidApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    #[error("Rate limited. Retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    /// Reply had no usable verdict
    #[error("Invalid verifier response: {0}")]
    InvalidResponse(String),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl VerifyError {
    /// Check if a later request may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VerifyError::RateLimited { .. }
                | VerifyError::RequestError(_)
                | VerifyError::Cancelled
                | VerifyError::InvalidResponse(_)
        )
    }

    /// Check if the stored key needs replacing
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            VerifyError::ApiKeyNotFound
                | VerifyError::InvalidApiKey
                | VerifyError::ApiError { status: 400 | 401 | 403, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(VerifyError::RateLimited { retry_after_seconds: 5 }.is_recoverable());
        assert!(VerifyError::InvalidResponse("empty".into()).is_recoverable());
        assert!(!VerifyError::ApiKeyNotFound.is_recoverable());
        assert!(VerifyError::ApiError { status: 403, message: String::new() }.requires_reauth());
        assert!(!VerifyError::ApiError { status: 500, message: String::new() }.requires_reauth());
    }
}
