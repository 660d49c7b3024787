//! Integration tests for the file-backed state store.

use store::{
    BlobWrite, CollectionKey, FileStateStore, Revision, SCHEMA_VERSION, StateStore,
    StateStoreExt, StoreError, WriteOptions,
};

async fn open_store() -> (tempfile::TempDir, FileStateStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStateStore::open(dir.path()).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn writes_one_file_per_collection() {
    let (dir, store) = open_store().await;

    store
        .save_collection(CollectionKey::Orders, &vec![1, 2, 3], WriteOptions::new())
        .await
        .unwrap();

    let path = dir.path().join("osmech.orders.json");
    assert!(path.exists());

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["schema_version"], SCHEMA_VERSION);
    assert_eq!(raw["collection"], "orders");
    assert_eq!(raw["revision"], 1);
    assert_eq!(raw["payload"], serde_json::json!([1, 2, 3]));
}

#[tokio::test]
async fn reopened_store_sees_previous_writes() {
    let (dir, store) = open_store().await;
    store
        .save_collection(CollectionKey::Users, &vec!["ana"], WriteOptions::new())
        .await
        .unwrap();
    drop(store);

    let reopened = FileStateStore::open(dir.path()).await.unwrap();
    let (users, revision): (Vec<String>, _) =
        reopened.load_collection(CollectionKey::Users).await.unwrap();
    assert_eq!(users, vec!["ana"]);
    assert_eq!(revision, Revision::new(1));
}

#[tokio::test]
async fn legacy_unversioned_file_is_upgraded_on_read() {
    let (dir, store) = open_store().await;
    std::fs::write(
        dir.path().join("osmech.inventory.json"),
        r#"[{"code":"FLT-01"}]"#,
    )
    .unwrap();

    let (payload, revision) = store.load(CollectionKey::Inventory).await.unwrap().unwrap();
    assert_eq!(payload, serde_json::json!([{"code": "FLT-01"}]));
    assert_eq!(revision, Revision::initial());

    // First versioned write lands on revision 1
    let revision = store
        .save_collection(
            CollectionKey::Inventory,
            &payload,
            WriteOptions::expect_revision(Revision::initial()),
        )
        .await
        .unwrap();
    assert_eq!(revision, Revision::new(1));
}

#[tokio::test]
async fn conflicting_batch_leaves_files_untouched() {
    let (_dir, store) = open_store().await;
    store
        .save_collection(CollectionKey::Orders, &vec![1], WriteOptions::new())
        .await
        .unwrap();

    let writes = vec![
        BlobWrite::new(
            CollectionKey::Inventory,
            &vec![9],
            WriteOptions::expect_revision(Revision::initial()),
        )
        .unwrap(),
        BlobWrite::new(
            CollectionKey::Orders,
            &vec![1, 2],
            WriteOptions::expect_revision(Revision::initial()),
        )
        .unwrap(),
    ];

    let result = store.commit(writes).await;
    assert!(matches!(
        result,
        Err(StoreError::ConcurrencyConflict { .. })
    ));
    assert_eq!(
        store.revision(CollectionKey::Inventory).await.unwrap(),
        Revision::initial()
    );
    let (orders, _): (Vec<i32>, _) = store.load_collection(CollectionKey::Orders).await.unwrap();
    assert_eq!(orders, vec![1]);
}

#[tokio::test]
async fn journaled_batch_is_completed_on_reopen() {
    let (dir, store) = open_store().await;
    store
        .save_collection(CollectionKey::Orders, &vec![1], WriteOptions::new())
        .await
        .unwrap();
    drop(store);

    // A commit that staged both files and wrote its journal, then stopped
    // before renaming anything.
    std::fs::write(dir.path().join("osmech.orders.json.tmp"), "[1, 2]").unwrap();
    std::fs::write(dir.path().join("osmech.logs.json.tmp"), r#"["created"]"#).unwrap();
    std::fs::write(
        dir.path().join("osmech.commit.journal"),
        r#"["orders","logs"]"#,
    )
    .unwrap();

    let reopened = FileStateStore::open(dir.path()).await.unwrap();
    let (orders, _): (Vec<i32>, _) = reopened.load_collection(CollectionKey::Orders).await.unwrap();
    let (logs, _): (Vec<String>, _) = reopened.load_collection(CollectionKey::Logs).await.unwrap();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(logs, vec!["created"]);
    assert!(!dir.path().join("osmech.commit.journal").exists());
    assert!(!dir.path().join("osmech.orders.json.tmp").exists());
}

#[tokio::test]
async fn staged_files_without_journal_are_discarded() {
    let (dir, store) = open_store().await;
    store
        .save_collection(CollectionKey::Orders, &vec![1], WriteOptions::new())
        .await
        .unwrap();

    // Interrupted before the journal: the batch never happened.
    std::fs::write(dir.path().join("osmech.orders.json.tmp"), "[1, 2, 3]").unwrap();

    let revision = store
        .save_collection(
            CollectionKey::Orders,
            &vec![1, 4],
            WriteOptions::expect_revision(Revision::new(1)),
        )
        .await
        .unwrap();
    assert_eq!(revision, Revision::new(2));
    let (orders, _): (Vec<i32>, _) = store.load_collection(CollectionKey::Orders).await.unwrap();
    assert_eq!(orders, vec![1, 4]);
    assert!(!dir.path().join("osmech.commit.journal").exists());
}
