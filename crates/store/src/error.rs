use thiserror::Error;

use crate::{CollectionKey, Revision};

/// Errors that can occur when interacting with the state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrency conflict occurred when committing a collection.
    /// The expected revision did not match the stored revision.
    #[error(
        "Concurrency conflict on {collection}: expected revision {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        collection: CollectionKey,
        expected: Revision,
        actual: Revision,
    },

    /// A blob was written by a newer schema than this build understands.
    #[error("Unsupported schema version {found} for {collection} (supported up to {supported})")]
    UnsupportedSchema {
        collection: CollectionKey,
        found: u32,
        supported: u32,
    },

    /// A blob was found under a key that belongs to another collection.
    #[error("Blob stored under {expected} claims to be {found}")]
    CollectionMismatch {
        expected: CollectionKey,
        found: CollectionKey,
    },

    /// The commit batch itself is malformed.
    #[error("Invalid commit: {0}")]
    InvalidCommit(String),

    /// A filesystem error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
