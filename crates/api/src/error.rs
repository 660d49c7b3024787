//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diagnosis::DiagnosisError;
use domain::{DomainError, ErrorKind};
use reports::ReportError;
use serde::Serialize;
use validator::ValidationErrors;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No acting user could be identified.
    Unauthenticated(String),
    /// Malformed path or query input.
    BadRequest(String),
    /// Body failed its validation rules.
    Invalid(ValidationErrors),
    /// Domain logic error.
    Domain(DomainError),
    /// Report building error.
    Report(ReportError),
    /// The diagnosis provider failed.
    Diagnosis(DiagnosisError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: ErrorKind,
}

impl ApiError {
    /// Error taxonomy kind reported in the response body.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated(_) => ErrorKind::Authorization,
            ApiError::BadRequest(_) | ApiError::Invalid(_) => ErrorKind::Validation,
            ApiError::Domain(err) => err.kind(),
            ApiError::Report(err) => err.kind(),
            ApiError::Diagnosis(err) => err.kind(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => status_for(self.kind()),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) | ApiError::BadRequest(msg) => f.write_str(msg),
            ApiError::Invalid(err) => write!(f, "{err}"),
            ApiError::Domain(err) => write!(f, "{err}"),
            ApiError::Report(err) => write!(f, "{err}"),
            ApiError::Diagnosis(err) => write!(f, "{err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        match kind {
            ErrorKind::Internal => tracing::error!(error = %self, "internal server error"),
            ErrorKind::ExternalService => tracing::warn!(error = %self, "external service failed"),
            _ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
        }

        let body = ErrorBody {
            error: self.to_string(),
            kind,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(err: DiagnosisError) -> Self {
        ApiError::Diagnosis(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Invalid(err)
    }
}

/// Error raised while assembling the application at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("store: {0}")]
    Store(#[from] store::StoreError),

    #[error("diagnosis: {0}")]
    Diagnosis(#[from] DiagnosisError),

    #[error("bootstrap: {0}")]
    Domain(#[from] DomainError),

    #[error("metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}
