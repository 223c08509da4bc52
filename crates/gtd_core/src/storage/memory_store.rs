use super::{KeyValueStore, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-process key/value store.
///
/// Supports an optional byte quota and an "unavailable" mode in which every
/// call fails, matching a browser with storage disabled.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: bool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let mut items = self.items.borrow_mut();

        if let Some(quota) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.ensure_available()?;
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn quota_counts_keys_and_values_and_allows_overwrite() {
        let store = MemoryKeyValueStore::with_quota(10);
        store.set_item("ab", "cdef").unwrap();
        store.set_item("ab", "cdefgh").unwrap();

        let err = store.set_item("xy", "z").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }));
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = MemoryKeyValueStore::unavailable();
        assert!(store.get_item("a").is_err());
        assert!(store.set_item("a", "b").is_err());
        assert!(store.keys().is_err());
    }
}
