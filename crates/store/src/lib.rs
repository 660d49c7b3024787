pub mod blob;
pub mod collection;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use blob::{Revision, SCHEMA_VERSION, StoredBlob};
pub use collection::CollectionKey;
pub use error::{Result, StoreError};
pub use file::FileStateStore;
pub use memory::InMemoryStateStore;
pub use store::{BlobWrite, StateStore, StateStoreExt, WriteOptions};
