//! Tests for store module

#[cfg(test)]
mod tests {
    use super::super::SubscriptionStore;
    use crate::types::{AlertConfig, AlertKey};
    use chrono::{Duration, Utc};
    use std::fs;
    use std::path::PathBuf;

    /// Unique per-test file under the system temp dir, removed on drop
    struct TempPath(PathBuf);

    impl TempPath {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "curve_alert_store_{}_{}.json",
                name,
                std::process::id()
            ));
            let _ = fs::remove_file(&path);
            Self(path)
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn config(threshold: u32, interval_hours: u32) -> AlertConfig {
        AlertConfig {
            threshold,
            interval_hours,
            last_check: Utc::now(),
        }
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let tmp = TempPath::new("missing");
        let store = SubscriptionStore::load(&tmp.0).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let tmp = TempPath::new("corrupt");
        fs::write(&tmp.0, "{not json").unwrap();
        assert!(SubscriptionStore::load(&tmp.0).is_err());
    }

    #[test]
    fn test_upsert_round_trips_through_disk() {
        let tmp = TempPath::new("roundtrip");
        let key = AlertKey::new(42, -100123);
        let written = config(25, 6);

        {
            let store = SubscriptionStore::load(&tmp.0).unwrap();
            store.upsert(key, written.clone()).unwrap();
        }

        let reloaded = SubscriptionStore::load(&tmp.0).unwrap();
        let all = reloaded.all();
        assert_eq!(all.len(), 1);
        let (got_key, got) = &all[0];
        assert_eq!(*got_key, key);
        assert_eq!(got.threshold, written.threshold);
        assert_eq!(got.interval_hours, written.interval_hours);
        // RFC 3339 preserves the timestamp exactly
        assert_eq!(got.last_check, written.last_check);
    }

    #[test]
    fn test_upsert_overwrites_not_merges() {
        let tmp = TempPath::new("overwrite");
        let store = SubscriptionStore::load(&tmp.0).unwrap();
        let key = AlertKey::new(1, 1);

        store.upsert(key, config(20, 2)).unwrap();
        store.upsert(key, config(35, 12)).unwrap();

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.threshold, 35);
        assert_eq!(all[0].1.interval_hours, 12);
    }

    #[test]
    fn test_same_user_different_chats_are_distinct() {
        let tmp = TempPath::new("distinct");
        let store = SubscriptionStore::load(&tmp.0).unwrap();

        store.upsert(AlertKey::new(7, 7), config(10, 1)).unwrap();
        store.upsert(AlertKey::new(7, -500), config(40, 24)).unwrap();

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_reports_absence() {
        let tmp = TempPath::new("delete");
        let store = SubscriptionStore::load(&tmp.0).unwrap();
        let key = AlertKey::new(9, 9);

        assert!(!store.delete(key).unwrap());
        store.upsert(key, config(15, 3)).unwrap();
        assert!(store.delete(key).unwrap());
        assert!(!store.delete(key).unwrap());
    }

    #[test]
    fn test_touch_updates_last_check() {
        let tmp = TempPath::new("touch");
        let store = SubscriptionStore::load(&tmp.0).unwrap();
        let key = AlertKey::new(3, 3);

        let old = Utc::now() - Duration::hours(5);
        store
            .upsert(
                key,
                AlertConfig {
                    threshold: 20,
                    interval_hours: 1,
                    last_check: old,
                },
            )
            .unwrap();

        let now = Utc::now();
        store.touch(key, now).unwrap();

        let all = store.all();
        assert_eq!(all[0].1.last_check, now);
        assert_eq!(all[0].1.threshold, 20);
    }

    #[test]
    fn test_touch_on_deleted_key_is_a_noop() {
        let tmp = TempPath::new("touch_deleted");
        let store = SubscriptionStore::load(&tmp.0).unwrap();
        let key = AlertKey::new(4, 4);

        store.upsert(key, config(30, 2)).unwrap();
        store.delete(key).unwrap();
        store.touch(key, Utc::now()).unwrap();

        // A touch must never resurrect a cancelled subscription
        assert!(store.is_empty());

        let reloaded = SubscriptionStore::load(&tmp.0).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_delete_persists_to_disk() {
        let tmp = TempPath::new("delete_persists");
        let key = AlertKey::new(5, 5);

        {
            let store = SubscriptionStore::load(&tmp.0).unwrap();
            store.upsert(key, config(25, 4)).unwrap();
            store.delete(key).unwrap();
        }

        let reloaded = SubscriptionStore::load(&tmp.0).unwrap();
        assert!(reloaded.is_empty());
    }
}
