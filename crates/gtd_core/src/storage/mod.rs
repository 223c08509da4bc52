//! Local persistence for client-side state.
//!
//! # Responsibility
//! - Define the `KeyValueStore` contract standing in for browser
//!   localStorage, plus SQLite and in-memory implementations.
//! - Layer the namespaced, timestamped `LocalCache` on top.
//!
//! # Invariants
//! - Store implementations never panic; failures surface as `StorageError`.
//! - `LocalCache` swallows store errors (logged at `warn`) and substitutes
//!   defaults, so storage trouble never blocks a screen.

pub mod local_cache;
mod memory_store;
mod sqlite_store;

pub use local_cache::{
    InboxDraft, LocalCache, RecentActivity, StorageUsage, UserSettings, MAX_RECENT_ACTIVITIES,
};
pub use memory_store::MemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;

use crate::db::DbError;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to encode or decode stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key/value storage with localStorage semantics.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Shares one store between a cache and its owner.
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
}
