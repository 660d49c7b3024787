//! Diagnosis error types.

use domain::ErrorKind;
use thiserror::Error;

/// Errors that can occur while asking for a diagnosis.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// No API key or provider configured.
    #[error("Diagnosis service not configured: {0}")]
    NotConfigured(String),

    /// The request never reached the provider or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered 429.
    #[error("Diagnosis provider rate limited the request")]
    RateLimited,

    /// The provider answered with a non-success status.
    #[error("Diagnosis provider error {status}: {body}")]
    Api { status: u16, body: String },

    /// The provider blocked the answer.
    #[error("Diagnosis blocked by the provider safety filter")]
    ContentFiltered,

    /// The answer did not contain a usable diagnosis.
    #[error("Invalid diagnosis response: {0}")]
    InvalidResponse(String),
}

impl DiagnosisError {
    /// Every diagnosis failure is an external-service failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalService
    }

    /// Short label used for the failure metric.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosisError::NotConfigured(_) => "not_configured",
            DiagnosisError::Network(_) => "network",
            DiagnosisError::RateLimited => "rate_limited",
            DiagnosisError::Api { .. } => "api",
            DiagnosisError::ContentFiltered => "content_filtered",
            DiagnosisError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for DiagnosisError {
    fn from(err: reqwest::Error) -> Self {
        DiagnosisError::Network(err.to_string())
    }
}

/// Convenience type alias for diagnosis results.
pub type Result<T> = std::result::Result<T, DiagnosisError>;
