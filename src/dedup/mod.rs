//! Group-chat anti-spam gate
//!
//! Remembers the last on-demand report sent to each group so a repeat
//! request within the cooldown replaces the old message instead of
//! stacking a duplicate.


use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// How long a previous report stays subject to replacement
const COOLDOWN_HOURS: i64 = 6;

#[derive(Debug, Clone, Copy)]
struct RecentReport {
    sent_at: DateTime<Utc>,
    message_id: i64,
}

/// Per-group record of the last on-demand report. Private chats never
/// consult this gate.
#[derive(Default)]
pub struct DedupGate {
    inner: Mutex<HashMap<i64, RecentReport>>,
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message id of a prior report still inside the cooldown window,
    /// if any. The caller should delete it before sending a new one.
    pub fn stale_message(&self, chat_id: i64, now: DateTime<Utc>) -> Option<i64> {
        let map = self.inner.lock();
        map.get(&chat_id).and_then(|record| {
            if now - record.sent_at < Duration::hours(COOLDOWN_HOURS) {
                Some(record.message_id)
            } else {
                None
            }
        })
    }

    /// Record the report just sent, overwriting any prior record
    pub fn record(&self, chat_id: i64, now: DateTime<Utc>, message_id: i64) {
        let mut map = self.inner.lock();
        map.insert(
            chat_id,
            RecentReport {
                sent_at: now,
                message_id,
            },
        );
    }
}
