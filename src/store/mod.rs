//! Durable subscription storage
//!
//! Owns the subscriber -> alert configuration map and persists it to a
//! JSON file after every mutation.

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::types::{AlertConfig, AlertKey};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk record, one per subscription
#[derive(Debug, Serialize, Deserialize)]
struct StoredAlert {
    user_id: i64,
    chat_id: i64,
    threshold: u32,
    interval_hours: u32,
    last_check: DateTime<Utc>,
}

/// Single writer for all subscription records.
///
/// Every mutation saves the full store before returning. A failed save
/// is surfaced to the caller but leaves the in-memory state
/// authoritative; the next successful save catches up.
pub struct SubscriptionStore {
    path: PathBuf,
    inner: Mutex<HashMap<AlertKey, AlertConfig>>,
}

impl SubscriptionStore {
    /// Load the store from disk, or start empty if the file is absent.
    ///
    /// An unreadable or corrupt file is an error: silently discarding
    /// configured alerts at startup is worse than failing loudly.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let map = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let records: Vec<StoredAlert> = serde_json::from_str(&raw)?;
            records
                .into_iter()
                .map(|r| {
                    (
                        AlertKey::new(r.user_id, r.chat_id),
                        AlertConfig {
                            threshold: r.threshold,
                            interval_hours: r.interval_hours,
                            last_check: r.last_check,
                        },
                    )
                })
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    /// Create or overwrite the subscription for `key`
    pub fn upsert(&self, key: AlertKey, config: AlertConfig) -> Result<()> {
        let mut map = self.inner.lock();
        map.insert(key, config);
        self.save(&map)
    }

    /// Remove the subscription for `key`; returns false if absent
    pub fn delete(&self, key: AlertKey) -> Result<bool> {
        let mut map = self.inner.lock();
        if map.remove(&key).is_none() {
            return Ok(false);
        }
        self.save(&map)?;
        Ok(true)
    }

    /// Update only the last-check timestamp. A no-op if the key is
    /// absent: a subscription cancelled mid-cycle must stay cancelled.
    pub fn touch(&self, key: AlertKey, now: DateTime<Utc>) -> Result<()> {
        let mut map = self.inner.lock();
        match map.get_mut(&key) {
            Some(config) => {
                config.last_check = now;
                self.save(&map)
            }
            None => Ok(()),
        }
    }

    /// Snapshot of all subscriptions
    pub fn all(&self) -> Vec<(AlertKey, AlertConfig)> {
        self.inner
            .lock()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }

    /// Number of active subscriptions
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Serialize the full map and replace the file atomically
    fn save(&self, map: &HashMap<AlertKey, AlertConfig>) -> Result<()> {
        let records: Vec<StoredAlert> = map
            .iter()
            .map(|(key, config)| StoredAlert {
                user_id: key.user_id,
                chat_id: key.chat_id,
                threshold: config.threshold,
                interval_hours: config.interval_hours,
                last_check: config.last_check,
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
