use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    CollectionKey, Result, Revision, StoredBlob,
    store::{BlobWrite, StateStore, check_revision, validate_writes},
};

/// Name of the journal that marks a batch as committed.
const JOURNAL_FILE: &str = "osmech.commit.journal";

/// File-backed state store: one JSON document per collection.
///
/// Each collection is written to `<dir>/osmech.<collection>.json`. A commit
/// stages every file of the batch as `*.tmp`, then writes the journal
/// listing the staged collections. The journal is the commit point: once it
/// exists the batch is rolled forward, by the same commit or, if that one
/// was interrupted, by the next `open` or `commit`. A process-wide lock
/// serializes commits.
///
/// Readers do not take the lock, so a `load` racing the rename step can see
/// part of a batch.
#[derive(Clone)]
pub struct FileStateStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStateStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let store = Self {
            dir,
            lock: Arc::new(Mutex::new(())),
        };
        {
            let _guard = store.lock.lock().await;
            store.roll_forward().await?;
        }
        tracing::info!(dir = %store.dir.display(), "opened file state store");
        Ok(store)
    }

    /// Returns the directory the store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: CollectionKey) -> PathBuf {
        self.dir.join(format!("{}.json", collection.storage_key()))
    }

    fn temp_path_for(&self, collection: CollectionKey) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", collection.storage_key()))
    }

    fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_FILE)
    }

    /// Renames the staged files listed in the journal into place and removes
    /// the journal. Returns how many collections it listed; 0 without a
    /// journal. Caller holds the lock.
    async fn apply_journal(&self) -> Result<usize> {
        let journal = self.journal_path();
        let bytes = match tokio::fs::read(&journal).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let pending: Vec<CollectionKey> = serde_json::from_slice(&bytes)?;
        for collection in &pending {
            let temp = self.temp_path_for(*collection);
            if tokio::fs::try_exists(&temp).await? {
                tokio::fs::rename(&temp, self.path_for(*collection)).await?;
            }
        }
        tokio::fs::remove_file(&journal).await?;
        Ok(pending.len())
    }

    /// Completes a batch left behind by an interrupted commit.
    async fn roll_forward(&self) -> Result<()> {
        let collections = self.apply_journal().await?;
        if collections > 0 {
            tracing::warn!(collections, "completed interrupted commit");
        }
        Ok(())
    }

    async fn read_blob(&self, collection: CollectionKey) -> Result<Option<StoredBlob>> {
        let path = self.path_for(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let raw: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(Some(StoredBlob::decode(collection, raw)?))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, collection: CollectionKey) -> Result<Option<(serde_json::Value, Revision)>> {
        Ok(self
            .read_blob(collection)
            .await?
            .map(|blob| (blob.payload, blob.revision)))
    }

    async fn commit(&self, writes: Vec<BlobWrite>) -> Result<Vec<Revision>> {
        validate_writes(&writes)?;

        let _guard = self.lock.lock().await;
        self.roll_forward().await?;

        let mut staged = Vec::with_capacity(writes.len());
        for write in &writes {
            let current = self
                .read_blob(write.collection)
                .await?
                .map(|b| b.revision)
                .unwrap_or_default();
            check_revision(write, current)?;
            staged.push(current.next());
        }

        for (write, revision) in writes.iter().zip(&staged) {
            let blob = StoredBlob::new(write.collection, *revision, write.payload.clone());
            let bytes = serde_json::to_vec_pretty(&blob)?;
            tokio::fs::write(self.temp_path_for(write.collection), bytes).await?;
        }

        let collections: Vec<CollectionKey> = writes.iter().map(|w| w.collection).collect();
        let journal_tmp = self.dir.join(format!("{JOURNAL_FILE}.tmp"));
        tokio::fs::write(&journal_tmp, serde_json::to_vec(&collections)?).await?;
        tokio::fs::rename(&journal_tmp, self.journal_path()).await?;

        self.apply_journal().await?;

        tracing::debug!(collections = writes.len(), "committed batch to disk");
        Ok(staged)
    }

    async fn revision(&self, collection: CollectionKey) -> Result<Revision> {
        Ok(self
            .read_blob(collection)
            .await?
            .map(|b| b.revision)
            .unwrap_or_default())
    }
}
