//! Namespaced, timestamped cache over a `KeyValueStore`.
//!
//! # Responsibility
//! - Store JSON values as `{data, timestamp}` entries under a fixed prefix.
//! - Answer freshness questions and sweep expired entries.
//! - Persist the client's small pieces of state: user settings, the recent
//!   activity log and the inbox draft.
//!
//! # Invariants
//! - Support is probed exactly once, at construction. An unsupported cache
//!   answers every read with the default and every write with `false`.
//! - An entry is fresh iff `now - timestamp < max_age`.
//! - The recent activity log never holds more than
//!   [`MAX_RECENT_ACTIVITIES`] entries, newest first.

use super::KeyValueStore;
use crate::clock::{duration_to_millis, Clock, EpochMillis};
use crate::config::StorageConfig;
use log::{debug, warn};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

pub const MAX_RECENT_ACTIVITIES: usize = 50;

const PROBE_KEY: &str = "__storage_test__";
const USER_SETTINGS_KEY: &str = "user_settings";
const RECENT_ACTIVITIES_KEY: &str = "recent_activities";
const INBOX_DRAFT_KEY: &str = "inbox_draft";

#[derive(Serialize)]
struct EntryRef<'a, T: ?Sized> {
    data: &'a T,
    timestamp: EpochMillis,
}

#[derive(Deserialize)]
struct Entry<T> {
    data: T,
    timestamp: EpochMillis,
}

/// Timestamp-only view of an entry; the payload is skipped, not decoded.
#[derive(Deserialize)]
struct EntryStamp {
    #[allow(dead_code)]
    data: IgnoredAny,
    timestamp: EpochMillis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub used: u64,
    pub total: u64,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: String,
    pub notifications: bool,
    pub auto_save: bool,
    pub keyboard_shortcuts: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            notifications: true,
            auto_save: true,
            keyboard_shortcuts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub activity: String,
    pub timestamp: EpochMillis,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InboxDraft {
    pub title: String,
    pub description: String,
}

impl InboxDraft {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

pub struct LocalCache {
    store: Box<dyn KeyValueStore>,
    prefix: String,
    quota_bytes: u64,
    clock: Rc<dyn Clock>,
    supported: bool,
}

impl LocalCache {
    pub fn new(store: Box<dyn KeyValueStore>, config: &StorageConfig, clock: Rc<dyn Clock>) -> Self {
        let supported = probe(store.as_ref());
        if !supported {
            warn!("event=cache_probe module=storage status=unsupported");
        }
        Self {
            store,
            prefix: config.prefix.clone(),
            quota_bytes: config.quota_bytes,
            clock,
            supported,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Stores `value` stamped with the current time. Returns `false` when
    /// storage is unsupported or the write fails.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        if !self.supported {
            return false;
        }
        let entry = EntryRef {
            data: value,
            timestamp: self.clock.now_ms(),
        };
        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("event=cache_set module=storage status=error key={key} error={err}");
                return false;
            }
        };
        match self.store.set_item(&self.namespaced(key), &encoded) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=cache_set module=storage status=error key={key} error={err}");
                false
            }
        }
    }

    /// Reads a value regardless of age. Absent, unparsable or unsupported
    /// all read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_entry::<T>(key).map(|entry| entry.data)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Reads a value only if it is younger than `max_age`.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let entry = self.read_entry::<T>(key)?;
        self.is_fresh(entry.timestamp, max_age).then_some(entry.data)
    }

    pub fn remove(&self, key: &str) -> bool {
        if !self.supported {
            return false;
        }
        match self.store.remove_item(&self.namespaced(key)) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=cache_remove module=storage status=error key={key} error={err}");
                false
            }
        }
    }

    /// Removes every namespaced key; foreign keys in the store are untouched.
    pub fn clear(&self) -> bool {
        if !self.supported {
            return false;
        }
        let keys = match self.namespaced_keys() {
            Some(keys) => keys,
            None => return false,
        };
        let mut ok = true;
        for full_key in keys {
            if let Err(err) = self.store.remove_item(&full_key) {
                warn!("event=cache_clear module=storage status=error error={err}");
                ok = false;
            }
        }
        ok
    }

    pub fn is_cache_valid(&self, key: &str, max_age: Duration) -> bool {
        self.read_stamp(&self.namespaced(key))
            .is_some_and(|timestamp| self.is_fresh(timestamp, max_age))
    }

    /// Deletes expired and unparsable entries; returns how many were removed.
    pub fn clean_expired_cache(&self, max_age: Duration) -> usize {
        if !self.supported {
            return 0;
        }
        let keys = match self.namespaced_keys() {
            Some(keys) => keys,
            None => return 0,
        };

        let mut removed = 0;
        for full_key in keys {
            let keep = self
                .read_stamp(&full_key)
                .is_some_and(|timestamp| self.is_fresh(timestamp, max_age));
            if keep {
                continue;
            }
            match self.store.remove_item(&full_key) {
                Ok(()) => removed += 1,
                Err(err) => warn!("event=cache_clean module=storage status=error error={err}"),
            }
        }
        debug!("event=cache_clean module=storage status=ok removed={removed}");
        removed
    }

    /// Byte-length estimate of namespaced entries against the configured quota.
    pub fn usage(&self) -> StorageUsage {
        let zero = StorageUsage {
            used: 0,
            total: 0,
            percentage: 0,
        };
        if !self.supported {
            return zero;
        }
        let Some(keys) = self.namespaced_keys() else {
            return zero;
        };

        let used: u64 = keys
            .iter()
            .filter_map(|full_key| self.store.get_item(full_key).ok().flatten())
            .map(|value| value.len() as u64)
            .sum();
        let total = self.quota_bytes;
        let percentage = if total == 0 {
            100
        } else {
            ((used as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };
        StorageUsage {
            used,
            total,
            percentage,
        }
    }

    pub fn save_user_settings(&self, settings: &UserSettings) -> bool {
        self.set(USER_SETTINGS_KEY, settings)
    }

    pub fn user_settings(&self) -> UserSettings {
        self.get_or(USER_SETTINGS_KEY, UserSettings::default())
    }

    /// Prepends an activity to the log, keeping the newest
    /// [`MAX_RECENT_ACTIVITIES`].
    pub fn save_recent_activity(&self, activity: impl Into<String>) -> bool {
        let mut activities: Vec<RecentActivity> = self.get_or(RECENT_ACTIVITIES_KEY, Vec::new());
        activities.insert(
            0,
            RecentActivity {
                activity: activity.into(),
                timestamp: self.clock.now_ms(),
            },
        );
        activities.truncate(MAX_RECENT_ACTIVITIES);
        self.set(RECENT_ACTIVITIES_KEY, &activities)
    }

    pub fn recent_activities(&self, limit: usize) -> Vec<RecentActivity> {
        let mut activities: Vec<RecentActivity> = self.get_or(RECENT_ACTIVITIES_KEY, Vec::new());
        activities.truncate(limit);
        activities
    }

    pub fn save_inbox_draft(&self, draft: &InboxDraft) -> bool {
        self.set(INBOX_DRAFT_KEY, draft)
    }

    pub fn inbox_draft(&self) -> Option<InboxDraft> {
        self.get(INBOX_DRAFT_KEY)
    }

    pub fn clear_inbox_draft(&self) -> bool {
        self.remove(INBOX_DRAFT_KEY)
    }

    fn is_fresh(&self, timestamp: EpochMillis, max_age: Duration) -> bool {
        self.clock.now_ms().saturating_sub(timestamp) < duration_to_millis(max_age)
    }

    fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Option<Entry<T>> {
        let raw = self.read_raw(&self.namespaced(key))?;
        match serde_json::from_str::<Entry<T>>(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("event=cache_get module=storage status=corrupt key={key} error={err}");
                None
            }
        }
    }

    fn read_stamp(&self, full_key: &str) -> Option<EpochMillis> {
        let raw = self.read_raw(full_key)?;
        serde_json::from_str::<EntryStamp>(&raw)
            .ok()
            .map(|stamp| stamp.timestamp)
    }

    fn read_raw(&self, full_key: &str) -> Option<String> {
        if !self.supported {
            return None;
        }
        match self.store.get_item(full_key) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=cache_get module=storage status=error error={err}");
                None
            }
        }
    }

    fn namespaced_keys(&self) -> Option<Vec<String>> {
        match self.store.keys() {
            Ok(keys) => Some(
                keys.into_iter()
                    .filter(|key| key.starts_with(&self.prefix))
                    .collect(),
            ),
            Err(err) => {
                warn!("event=cache_keys module=storage status=error error={err}");
                None
            }
        }
    }
}

fn probe(store: &dyn KeyValueStore) -> bool {
    store.set_item(PROBE_KEY, PROBE_KEY).is_ok() && store.remove_item(PROBE_KEY).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{InboxDraft, LocalCache};
    use crate::clock::ManualClock;
    use crate::config::StorageConfig;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn entries_are_prefixed_and_timestamped() {
        let clock = Rc::new(ManualClock::new(42));
        let cache = LocalCache::new(
            Box::new(MemoryKeyValueStore::new()),
            &StorageConfig::default(),
            clock,
        );
        assert!(cache.set("k", &vec![1, 2]));
        assert_eq!(cache.get::<Vec<i32>>("k"), Some(vec![1, 2]));
        assert!(cache.is_cache_valid("k", Duration::from_millis(1)));
    }

    #[test]
    fn draft_emptiness_requires_both_fields_blank() {
        assert!(InboxDraft::default().is_empty());
        let draft = InboxDraft {
            title: String::new(),
            description: "notes".into(),
        };
        assert!(!draft.is_empty());
    }

    #[test]
    fn probe_key_does_not_linger() {
        let store = MemoryKeyValueStore::new();
        assert!(super::probe(&store));
        assert!(store.keys().unwrap().is_empty());
    }
}
