//! Domain error types.

use serde::Serialize;
use store::StoreError;
use thiserror::Error;

use crate::auth::AuthError;
use crate::inventory::InventoryError;
use crate::order::OrderError;

/// Error taxonomy every failure is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad or missing input.
    Validation,
    /// The entity's state forbids the operation.
    InvalidState,
    /// The actor may not do this.
    Authorization,
    /// An external collaborator failed.
    ExternalService,
    NotFound,
    /// Concurrent modification or uniqueness clash.
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::Authorization => "AUTHORIZATION",
            ErrorKind::ExternalService => "EXTERNAL_SERVICE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the state store.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    /// An error occurred in the service order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred in the inventory.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Authorization failed.
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected outside an aggregate.
    #[error("Validation error: {0}")]
    Validation(String),

    /// State forbids the operation outside an aggregate.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Store(StoreError::ConcurrencyConflict { .. }) => ErrorKind::Conflict,
            DomainError::Store(_) | DomainError::Serialization(_) => ErrorKind::Internal,
            DomainError::Order(e) => e.kind(),
            DomainError::Inventory(e) => e.kind(),
            DomainError::Auth(e) => e.kind(),
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::InvalidState(_) => ErrorKind::InvalidState,
        }
    }
}
