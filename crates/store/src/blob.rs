use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{CollectionKey, Result, StoreError};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Revision number of a collection, used for optimistic concurrency control.
///
/// A collection that has never been written is at revision 0; every
/// committed write increments it by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Creates a revision from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the revision of a collection that has never been written.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next revision.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw revision value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A persisted collection: its payload plus the envelope that versions it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Schema version the payload was written with.
    pub schema_version: u32,

    /// The collection this blob belongs to.
    pub collection: CollectionKey,

    /// Revision of the collection after this write.
    pub revision: Revision,

    /// When the blob was written.
    pub saved_at: DateTime<Utc>,

    /// The serialized collection.
    pub payload: serde_json::Value,
}

impl StoredBlob {
    /// Creates a blob at the current schema version.
    pub fn new(collection: CollectionKey, revision: Revision, payload: serde_json::Value) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            collection,
            revision,
            saved_at: Utc::now(),
            payload,
        }
    }

    /// Creates a blob from a serializable collection.
    pub fn from_collection<T: Serialize>(
        collection: CollectionKey,
        revision: Revision,
        value: &T,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(Self::new(collection, revision, serde_json::to_value(value)?))
    }

    /// Deserializes the payload into a concrete collection type.
    pub fn into_collection<T: DeserializeOwned>(self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_value(self.payload)
    }

    /// Decodes raw JSON read from a backend into a blob for `collection`.
    ///
    /// Unversioned payloads (a bare array or object, as the browser app
    /// wrote them) are upgraded to the current schema at revision 0.
    pub fn decode(collection: CollectionKey, raw: serde_json::Value) -> Result<Self> {
        let is_envelope = raw
            .as_object()
            .is_some_and(|obj| obj.contains_key("schema_version") && obj.contains_key("payload"));

        if !is_envelope {
            tracing::info!(%collection, "upgrading unversioned blob to schema {SCHEMA_VERSION}");
            return Ok(Self::new(collection, Revision::initial(), raw));
        }

        let blob: StoredBlob = serde_json::from_value(raw)?;
        if blob.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                collection,
                found: blob.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        if blob.collection != collection {
            return Err(StoreError::CollectionMismatch {
                expected: collection,
                found: blob.collection,
            });
        }
        Ok(blob)
    }
}
