use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{CollectionKey, Result, Revision, StoreError};

/// Options for writing a collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Expected revision of the collection for optimistic concurrency control.
    /// If None, no revision check is performed (last write wins).
    pub expected_revision: Option<Revision>,
}

impl WriteOptions {
    /// Creates options with no revision check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the collection to be at a specific revision.
    pub fn expect_revision(revision: Revision) -> Self {
        Self {
            expected_revision: Some(revision),
        }
    }
}

/// One collection write inside a commit.
#[derive(Debug, Clone)]
pub struct BlobWrite {
    pub collection: CollectionKey,
    pub payload: serde_json::Value,
    pub options: WriteOptions,
}

impl BlobWrite {
    /// Serializes `value` as the new content of `collection`.
    pub fn new<T: Serialize>(
        collection: CollectionKey,
        value: &T,
        options: WriteOptions,
    ) -> Result<Self> {
        Ok(Self {
            collection,
            payload: serde_json::to_value(value)?,
            options,
        })
    }
}

/// Core trait for state store implementations.
///
/// A state store keeps one versioned blob per collection. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the raw payload of a collection and its revision.
    ///
    /// Returns None if the collection has never been written.
    async fn load(&self, collection: CollectionKey) -> Result<Option<(serde_json::Value, Revision)>>;

    /// Commits a batch of collection writes.
    ///
    /// The batch is atomic: every revision check passes before anything is
    /// written, otherwise the whole batch fails with `ConcurrencyConflict`.
    ///
    /// Returns the new revision of each written collection, in batch order.
    async fn commit(&self, writes: Vec<BlobWrite>) -> Result<Vec<Revision>>;

    /// Gets the current revision of a collection.
    async fn revision(&self, collection: CollectionKey) -> Result<Revision>;
}

/// Extension trait providing typed access to collections.
#[async_trait]
pub trait StateStoreExt: StateStore {
    /// Loads a collection, falling back to its default when it was never written.
    async fn load_collection<T>(&self, collection: CollectionKey) -> Result<(T, Revision)>
    where
        T: DeserializeOwned + Default + Send,
    {
        match self.load(collection).await? {
            Some((payload, revision)) => Ok((serde_json::from_value(payload)?, revision)),
            None => Ok((T::default(), Revision::initial())),
        }
    }

    /// Writes a single collection.
    async fn save_collection<T>(
        &self,
        collection: CollectionKey,
        value: &T,
        options: WriteOptions,
    ) -> Result<Revision>
    where
        T: Serialize + Sync,
    {
        let revisions = self
            .commit(vec![BlobWrite::new(collection, value, options)?])
            .await?;
        revisions
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidCommit("commit returned no revision".to_string()))
    }
}

// Blanket implementation for all StateStore implementations
impl<T: StateStore + ?Sized> StateStoreExt for T {}

// Lets callers pick the backend at runtime behind `Box<dyn StateStore>`.
#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Box<T> {
    async fn load(&self, collection: CollectionKey) -> Result<Option<(serde_json::Value, Revision)>> {
        (**self).load(collection).await
    }

    async fn commit(&self, writes: Vec<BlobWrite>) -> Result<Vec<Revision>> {
        (**self).commit(writes).await
    }

    async fn revision(&self, collection: CollectionKey) -> Result<Revision> {
        (**self).revision(collection).await
    }
}

/// Validates a batch before committing.
pub fn validate_writes(writes: &[BlobWrite]) -> Result<()> {
    if writes.is_empty() {
        return Err(StoreError::InvalidCommit(
            "Cannot commit an empty batch".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for write in writes {
        if !seen.insert(write.collection) {
            return Err(StoreError::InvalidCommit(format!(
                "Collection {} appears more than once in the batch",
                write.collection
            )));
        }
    }

    Ok(())
}

/// Checks a write's expected revision against the stored one.
pub(crate) fn check_revision(write: &BlobWrite, current: Revision) -> Result<()> {
    if let Some(expected) = write.options.expected_revision
        && expected != current
    {
        metrics::counter!("store_conflicts_total").increment(1);
        return Err(StoreError::ConcurrencyConflict {
            collection: write.collection,
            expected,
            actual: current,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(collection: CollectionKey) -> BlobWrite {
        BlobWrite::new(collection, &serde_json::json!([]), WriteOptions::new()).unwrap()
    }

    #[test]
    fn empty_batch_is_invalid() {
        assert!(matches!(
            validate_writes(&[]),
            Err(StoreError::InvalidCommit(_))
        ));
    }

    #[test]
    fn duplicate_collection_is_invalid() {
        let writes = vec![write(CollectionKey::Orders), write(CollectionKey::Orders)];
        assert!(matches!(
            validate_writes(&writes),
            Err(StoreError::InvalidCommit(_))
        ));
    }

    #[test]
    fn distinct_collections_are_valid() {
        let writes = vec![write(CollectionKey::Orders), write(CollectionKey::Inventory)];
        assert!(validate_writes(&writes).is_ok());
    }

    #[test]
    fn revision_check_detects_mismatch() {
        let w = BlobWrite::new(
            CollectionKey::Orders,
            &serde_json::json!([]),
            WriteOptions::expect_revision(Revision::new(2)),
        )
        .unwrap();

        assert!(check_revision(&w, Revision::new(2)).is_ok());
        assert!(matches!(
            check_revision(&w, Revision::new(3)),
            Err(StoreError::ConcurrencyConflict { .. })
        ));
    }
}
