//! Alert setup dialog
//!
//! Explicit two-stage state machine that walks a subscriber through
//! choosing a threshold and a check interval. Sessions are ephemeral
//! and separate from the durable subscription store.


use crate::store::SubscriptionStore;
use crate::types::{AlertConfig, AlertKey, MAX_THRESHOLD, MIN_THRESHOLD};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::warn;

/// Where an in-progress session currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingThreshold,
    AwaitingInterval { threshold: u32 },
}

/// What the bot should say back after feeding input to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogReply {
    /// Session started; ask for the threshold
    PromptThreshold,
    /// Threshold input unparseable or out of range; ask again
    InvalidThreshold,
    /// Threshold accepted; ask for the interval
    PromptInterval,
    /// Interval input unparseable; ask again
    InvalidInterval,
    /// Subscription committed; the caller should confirm and send a
    /// test report at this threshold
    Committed { threshold: u32, interval_hours: u32 },
}

/// All in-progress setup sessions, keyed like subscriptions
#[derive(Default)]
pub struct DialogRegistry {
    sessions: Mutex<HashMap<AlertKey, Stage>>,
}

impl DialogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session for `key`, discarding any prior progress
    pub fn start(&self, key: AlertKey) -> DialogReply {
        self.sessions.lock().insert(key, Stage::AwaitingThreshold);
        DialogReply::PromptThreshold
    }

    /// Abandon an in-progress session; returns false if none existed
    pub fn cancel(&self, key: AlertKey) -> bool {
        self.sessions.lock().remove(&key).is_some()
    }

    pub fn is_active(&self, key: AlertKey) -> bool {
        self.sessions.lock().contains_key(&key)
    }

    /// Feed one free-text message into the session for `key`.
    ///
    /// Returns `None` when no session is active. Invalid input never
    /// aborts the session; it only re-prompts. A commit overwrites any
    /// existing subscription for the key with `last_check = now`.
    pub fn handle_input(
        &self,
        key: AlertKey,
        text: &str,
        store: &SubscriptionStore,
        now: DateTime<Utc>,
    ) -> Option<DialogReply> {
        let mut sessions = self.sessions.lock();
        let stage = *sessions.get(&key)?;

        let reply = match stage {
            Stage::AwaitingThreshold => match parse_threshold(text) {
                Some(threshold) => {
                    sessions.insert(key, Stage::AwaitingInterval { threshold });
                    DialogReply::PromptInterval
                }
                None => DialogReply::InvalidThreshold,
            },
            Stage::AwaitingInterval { threshold } => match parse_interval(text) {
                Some(interval_hours) => {
                    sessions.remove(&key);
                    let config = AlertConfig {
                        threshold,
                        interval_hours,
                        last_check: now,
                    };
                    if let Err(e) = store.upsert(key, config) {
                        // In-memory state is authoritative; the next
                        // successful save picks this up.
                        warn!("failed to persist subscription for {:?}: {}", key, e);
                    }
                    DialogReply::Committed {
                        threshold,
                        interval_hours,
                    }
                }
                None => DialogReply::InvalidInterval,
            },
        };

        Some(reply)
    }
}

/// Accepts a decimal entry and truncates it, then range-checks 10..=50
fn parse_threshold(text: &str) -> Option<u32> {
    let value = text.trim().parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < f64::from(MIN_THRESHOLD) || truncated > f64::from(MAX_THRESHOLD) {
        return None;
    }
    Some(truncated as u32)
}

/// Positive whole hours only
fn parse_interval(text: &str) -> Option<u32> {
    let hours = text.trim().parse::<u32>().ok()?;
    if hours == 0 {
        return None;
    }
    Some(hours)
}
