use gtd_core::clock::ManualClock;
use gtd_core::config::StorageConfig;
use gtd_core::storage::{
    InboxDraft, KeyValueStore, LocalCache, MemoryKeyValueStore, SqliteKeyValueStore, UserSettings,
    MAX_RECENT_ACTIVITIES,
};
use std::rc::Rc;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3_600);

fn cache_over(store: Rc<MemoryKeyValueStore>, clock: Rc<ManualClock>) -> LocalCache {
    LocalCache::new(Box::new(store), &StorageConfig::default(), clock)
}

#[test]
fn value_round_trips_within_max_age_and_expires_after() {
    let clock = Rc::new(ManualClock::new(1_000));
    let cache = cache_over(Rc::new(MemoryKeyValueStore::new()), clock.clone());

    assert!(cache.set("things", &vec![1, 2, 3]));
    clock.advance(Duration::from_secs(60));
    assert_eq!(cache.get::<Vec<i32>>("things"), Some(vec![1, 2, 3]));
    assert!(cache.is_cache_valid("things", HOUR));
    assert_eq!(cache.get_fresh::<Vec<i32>>("things", HOUR), Some(vec![1, 2, 3]));

    clock.advance(HOUR);
    assert!(!cache.is_cache_valid("things", HOUR));
    assert_eq!(cache.get_fresh::<Vec<i32>>("things", HOUR), None);
    assert_eq!(cache.get_or("missing", vec![9]), vec![9]);
}

#[test]
fn entry_exactly_max_age_old_is_expired() {
    let clock = Rc::new(ManualClock::new(0));
    let cache = cache_over(Rc::new(MemoryKeyValueStore::new()), clock.clone());

    cache.set("k", "v");
    clock.set(3_600_000);
    assert!(!cache.is_cache_valid("k", HOUR));
    clock.set(3_599_999);
    assert!(cache.is_cache_valid("k", HOUR));
}

#[test]
fn cleanup_removes_expired_and_corrupt_entries_only_in_namespace() {
    let clock = Rc::new(ManualClock::new(0));
    let store = Rc::new(MemoryKeyValueStore::new());
    let cache = cache_over(Rc::clone(&store), clock.clone());

    cache.set("old", &1);
    clock.set(2 * 3_600_000);
    cache.set("new", &2);
    store.set_item("gtd_todo_broken", "{not json").unwrap();
    store.set_item("other_app_key", "{not json").unwrap();

    assert_eq!(cache.get::<i32>("broken"), None);
    assert_eq!(cache.clean_expired_cache(HOUR), 2);

    assert_eq!(cache.get::<i32>("new"), Some(2));
    assert_eq!(cache.get::<i32>("old"), None);
    assert!(store.get_item("other_app_key").unwrap().is_some());
}

#[test]
fn clear_leaves_foreign_keys_alone() {
    let store = Rc::new(MemoryKeyValueStore::new());
    let cache = cache_over(Rc::clone(&store), Rc::new(ManualClock::new(0)));
    cache.set("a", &1);
    cache.set("b", &2);
    store.set_item("foreign", "x").unwrap();

    assert!(cache.clear());
    assert_eq!(cache.get::<i32>("a"), None);
    assert_eq!(store.keys().unwrap(), vec!["foreign".to_string()]);
}

#[test]
fn unavailable_store_degrades_to_defaults() {
    let cache = LocalCache::new(
        Box::new(MemoryKeyValueStore::unavailable()),
        &StorageConfig::default(),
        Rc::new(ManualClock::new(0)),
    );

    assert!(!cache.is_supported());
    assert!(!cache.set("k", &1));
    assert_eq!(cache.get_or("k", 7), 7);
    assert_eq!(cache.user_settings(), UserSettings::default());
    assert!(cache.recent_activities(10).is_empty());
    assert_eq!(cache.usage().total, 0);
    assert_eq!(cache.usage().percentage, 0);
    assert_eq!(cache.clean_expired_cache(HOUR), 0);
}

#[test]
fn recent_activities_are_newest_first_and_bounded() {
    let clock = Rc::new(ManualClock::new(0));
    let cache = cache_over(Rc::new(MemoryKeyValueStore::new()), clock.clone());

    for index in 0..(MAX_RECENT_ACTIVITIES + 5) {
        clock.set(index as i64);
        cache.save_recent_activity(format!("activity {index}"));
    }

    let all = cache.recent_activities(usize::MAX);
    assert_eq!(all.len(), MAX_RECENT_ACTIVITIES);
    assert_eq!(all[0].activity, format!("activity {}", MAX_RECENT_ACTIVITIES + 4));
    assert_eq!(all[0].timestamp, (MAX_RECENT_ACTIVITIES + 4) as i64);

    let recent = cache.recent_activities(5);
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[4].activity, format!("activity {}", MAX_RECENT_ACTIVITIES));
}

#[test]
fn user_settings_default_and_persist() {
    let cache = cache_over(Rc::new(MemoryKeyValueStore::new()), Rc::new(ManualClock::new(0)));
    let defaults = cache.user_settings();
    assert_eq!(defaults.theme, "light");
    assert!(defaults.keyboard_shortcuts);

    let custom = UserSettings {
        theme: "dark".into(),
        keyboard_shortcuts: false,
        ..UserSettings::default()
    };
    assert!(cache.save_user_settings(&custom));
    assert_eq!(cache.user_settings(), custom);
}

#[test]
fn usage_is_rounded_and_capped() {
    let config = StorageConfig {
        quota_bytes: 100,
        ..StorageConfig::default()
    };
    let cache = LocalCache::new(
        Box::new(MemoryKeyValueStore::new()),
        &config,
        Rc::new(ManualClock::new(0)),
    );
    assert_eq!(cache.usage().used, 0);

    cache.set("big", &"x".repeat(500));
    let usage = cache.usage();
    assert!(usage.used > 500);
    assert_eq!(usage.total, 100);
    assert_eq!(usage.percentage, 100);
}

#[test]
fn draft_survives_reopening_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let draft = InboxDraft {
        title: "buy milk".into(),
        description: "2L".into(),
    };

    {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        let cache = LocalCache::new(
            Box::new(store),
            &StorageConfig::default(),
            Rc::new(ManualClock::new(0)),
        );
        assert!(cache.save_inbox_draft(&draft));
    }

    let store = SqliteKeyValueStore::open(&path).unwrap();
    let cache = LocalCache::new(
        Box::new(store),
        &StorageConfig::default(),
        Rc::new(ManualClock::new(10)),
    );
    assert_eq!(cache.inbox_draft(), Some(draft));
    assert!(cache.clear_inbox_draft());
    assert_eq!(cache.inbox_draft(), None);
}
