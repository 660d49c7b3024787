use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CollectionKey, Result, Revision, StoredBlob,
    store::{BlobWrite, StateStore, check_revision, validate_writes},
};

/// In-memory state store implementation.
///
/// Used by tests and by the default server configuration; provides the
/// same interface as the file-backed store.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    blobs: Arc<RwLock<HashMap<CollectionKey, StoredBlob>>>,
}

impl InMemoryStateStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a collection with a raw (possibly unversioned) payload.
    pub async fn seed(&self, collection: CollectionKey, raw: serde_json::Value) -> Result<()> {
        let blob = StoredBlob::decode(collection, raw)?;
        self.blobs.write().await.insert(collection, blob);
        Ok(())
    }

    /// Returns the full stored blob of a collection.
    pub async fn blob(&self, collection: CollectionKey) -> Option<StoredBlob> {
        self.blobs.read().await.get(&collection).cloned()
    }

    /// Clears every collection.
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, collection: CollectionKey) -> Result<Option<(serde_json::Value, Revision)>> {
        let blobs = self.blobs.read().await;
        Ok(blobs
            .get(&collection)
            .map(|blob| (blob.payload.clone(), blob.revision)))
    }

    async fn commit(&self, writes: Vec<BlobWrite>) -> Result<Vec<Revision>> {
        validate_writes(&writes)?;

        let mut blobs = self.blobs.write().await;

        // Check every revision before touching anything
        for write in &writes {
            let current = blobs
                .get(&write.collection)
                .map(|b| b.revision)
                .unwrap_or_default();
            check_revision(write, current)?;
        }

        let mut revisions = Vec::with_capacity(writes.len());
        for write in writes {
            let next = blobs
                .get(&write.collection)
                .map(|b| b.revision)
                .unwrap_or_default()
                .next();
            blobs.insert(
                write.collection,
                StoredBlob::new(write.collection, next, write.payload),
            );
            revisions.push(next);
        }

        Ok(revisions)
    }

    async fn revision(&self, collection: CollectionKey) -> Result<Revision> {
        let blobs = self.blobs.read().await;
        Ok(blobs
            .get(&collection)
            .map(|b| b.revision)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StateStoreExt, StoreError, WriteOptions};

    #[tokio::test]
    async fn unwritten_collection_loads_default() {
        let store = InMemoryStateStore::new();
        let (values, revision): (Vec<String>, _) =
            store.load_collection(CollectionKey::Orders).await.unwrap();
        assert!(values.is_empty());
        assert_eq!(revision, Revision::initial());
    }

    #[tokio::test]
    async fn save_increments_revision() {
        let store = InMemoryStateStore::new();
        let r1 = store
            .save_collection(CollectionKey::Users, &vec!["ana"], WriteOptions::new())
            .await
            .unwrap();
        let r2 = store
            .save_collection(
                CollectionKey::Users,
                &vec!["ana", "bruno"],
                WriteOptions::expect_revision(r1),
            )
            .await
            .unwrap();

        assert_eq!(r1, Revision::new(1));
        assert_eq!(r2, Revision::new(2));

        let (users, revision): (Vec<String>, _) =
            store.load_collection(CollectionKey::Users).await.unwrap();
        assert_eq!(users, vec!["ana", "bruno"]);
        assert_eq!(revision, r2);
    }

    #[tokio::test]
    async fn stale_revision_conflicts() {
        let store = InMemoryStateStore::new();
        store
            .save_collection(CollectionKey::Orders, &vec![1], WriteOptions::new())
            .await
            .unwrap();

        let result = store
            .save_collection(
                CollectionKey::Orders,
                &vec![1, 2],
                WriteOptions::expect_revision(Revision::initial()),
            )
            .await;

        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn failed_batch_writes_nothing() {
        let store = InMemoryStateStore::new();
        store
            .save_collection(CollectionKey::Inventory, &vec![10], WriteOptions::new())
            .await
            .unwrap();

        let writes = vec![
            BlobWrite::new(
                CollectionKey::Orders,
                &vec![1],
                WriteOptions::expect_revision(Revision::initial()),
            )
            .unwrap(),
            BlobWrite::new(
                CollectionKey::Inventory,
                &vec![8],
                WriteOptions::expect_revision(Revision::initial()),
            )
            .unwrap(),
        ];
        assert!(store.commit(writes).await.is_err());

        assert_eq!(
            store.revision(CollectionKey::Orders).await.unwrap(),
            Revision::initial()
        );
        let (inventory, _): (Vec<i32>, _) =
            store.load_collection(CollectionKey::Inventory).await.unwrap();
        assert_eq!(inventory, vec![10]);
    }

    #[tokio::test]
    async fn seeded_legacy_payload_is_readable() {
        let store = InMemoryStateStore::new();
        store
            .seed(CollectionKey::Expenses, serde_json::json!(["rent"]))
            .await
            .unwrap();

        let (expenses, revision): (Vec<String>, _) =
            store.load_collection(CollectionKey::Expenses).await.unwrap();
        assert_eq!(expenses, vec!["rent"]);
        assert_eq!(revision, Revision::initial());
        assert!(store.blob(CollectionKey::Expenses).await.is_some());
    }
}
