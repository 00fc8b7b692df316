//! Inbound update routing
//!
//! Polls Telegram for updates and dispatches commands and dialog
//! replies to the core components.


use crate::dedup::DedupGate;
use crate::dialog::{DialogRegistry, DialogReply};
use crate::feed::FeedSource;
use crate::report::{self, ReportKind, ON_DEMAND_FLOOR};
use crate::store::SubscriptionStore;
use crate::telegram::{ChatMemberUpdated, Message, TelegramClient, Update};
use crate::types::AlertKey;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Long-poll timeout passed to getUpdates
const POLL_TIMEOUT_SECS: u64 = 30;
/// Backoff after a failed poll
const POLL_RETRY_SECS: u64 = 5;

const MSG_UNAUTHORIZED: &str =
    "This command is only available in private chats or to group administrators.";
const MSG_CANCELLED: &str = "All your alerts have been cancelled.";
const MSG_NO_ALERTS: &str = "You have no active alerts.";
const MSG_PROMPT_THRESHOLD: &str = "Enter the desired APY (10 to 50):";
const MSG_INVALID_THRESHOLD: &str = "Please enter a number from 10 to 50.";
const MSG_PROMPT_INTERVAL: &str = "Enter how often to check for alerts (in hours):";
const MSG_INVALID_INTERVAL: &str = "Please enter a valid whole number of hours.";
const MSG_GROUP_GREETING: &str =
    "Thanks for adding me to the group! Please make me an administrator so I can work correctly.";

/// A recognized bot command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/apy [N]` — on-demand top-pools report
    Apy { top_n: Option<usize> },
    /// `/alert_add` — start the setup dialog
    AlertAdd,
    /// `/alert_cancel` — drop the subscription
    AlertCancel,
}

/// Parse the leading command out of a message text, tolerating an
/// `@botname` suffix. Returns `None` for free text.
pub fn parse_command(text: &str) -> Option<Command> {
    let mut parts = text.split_whitespace();
    let first = parts.next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);

    match name {
        "apy" => {
            let top_n = parts
                .next()
                .filter(|arg| arg.chars().all(|c| c.is_ascii_digit()))
                .and_then(|arg| arg.parse().ok());
            Some(Command::Apy { top_n })
        }
        "alert_add" => Some(Command::AlertAdd),
        "alert_cancel" => Some(Command::AlertCancel),
        _ => None,
    }
}

pub struct Bot {
    telegram: TelegramClient,
    feed: Arc<dyn FeedSource>,
    store: Arc<SubscriptionStore>,
    dialogs: DialogRegistry,
    dedup: DedupGate,
}

impl Bot {
    pub fn new(
        telegram: TelegramClient,
        feed: Arc<dyn FeedSource>,
        store: Arc<SubscriptionStore>,
    ) -> Self {
        Self {
            telegram,
            feed,
            store,
            dialogs: DialogRegistry::new(),
            dedup: DedupGate::new(),
        }
    }

    /// Poll for updates forever
    pub async fn run(&self) {
        info!("update polling started");
        let mut offset = 0i64;

        loop {
            let updates = match self.telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(u) => u,
                Err(e) => {
                    warn!("getUpdates failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(POLL_RETRY_SECS)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                self.handle_update(update).await;
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        if let Some(member_update) = update.my_chat_member {
            self.on_membership_change(member_update).await;
        }
        if let Some(message) = update.message {
            self.handle_message(message).await;
        }
    }

    /// Greet the group when the bot is added as a plain member
    async fn on_membership_change(&self, update: ChatMemberUpdated) {
        if update.new_chat_member.status == "member" {
            self.reply(update.chat.id, MSG_GROUP_GREETING).await;
        }
    }

    async fn handle_message(&self, message: Message) {
        let Some(text) = message.text.clone() else {
            return;
        };

        // Anonymous group admins carry no user id; key them by chat
        let user_id = message
            .from
            .as_ref()
            .map(|u| u.id)
            .unwrap_or(message.chat.id);
        let key = AlertKey::new(user_id, message.chat.id);

        match parse_command(&text) {
            Some(Command::Apy { top_n }) => self.cmd_apy(&message, top_n).await,
            Some(Command::AlertAdd) => self.cmd_alert_add(&message, key).await,
            Some(Command::AlertCancel) => self.cmd_alert_cancel(&message, key).await,
            None => self.on_free_text(&message, key, &text).await,
        }
    }

    /// On-demand report, dedup-gated in group chats
    async fn cmd_apy(&self, message: &Message, top_n: Option<usize>) {
        let text = match self.feed.fetch().await {
            Ok(snapshot) => report::render(&snapshot, ReportKind::OnDemand, ON_DEMAND_FLOOR, top_n),
            Err(e) => {
                warn!("on-demand fetch failed: {}", e);
                report::DATA_UNAVAILABLE.to_string()
            }
        };

        let chat_id = message.chat.id;
        if message.chat.is_private() {
            self.reply(chat_id, &text).await;
            return;
        }

        let now = Utc::now();
        if let Some(stale_id) = self.dedup.stale_message(chat_id, now) {
            // Best effort: a vanished or undeletable message is not
            // worth failing the fresh report over.
            if let Err(e) = self.telegram.delete(chat_id, stale_id).await {
                error!("failed to delete previous report in chat {}: {}", chat_id, e);
            }
        }

        match self.telegram.send_message(chat_id, &text).await {
            Ok(message_id) => self.dedup.record(chat_id, now, message_id),
            Err(e) => warn!("failed to send report to chat {}: {}", chat_id, e),
        }
    }

    async fn cmd_alert_add(&self, message: &Message, key: AlertKey) {
        if !self.check_authorized(message).await {
            self.reply(message.chat.id, MSG_UNAUTHORIZED).await;
            return;
        }

        self.dialogs.start(key);
        self.reply(message.chat.id, MSG_PROMPT_THRESHOLD).await;
    }

    async fn cmd_alert_cancel(&self, message: &Message, key: AlertKey) {
        if !self.check_authorized(message).await {
            self.reply(message.chat.id, MSG_UNAUTHORIZED).await;
            return;
        }

        // An explicit cancel also abandons any half-finished setup
        self.dialogs.cancel(key);

        match self.store.delete(key) {
            Ok(true) => self.reply(message.chat.id, MSG_CANCELLED).await,
            Ok(false) => self.reply(message.chat.id, MSG_NO_ALERTS).await,
            Err(e) => {
                warn!("failed to persist cancellation for {:?}: {}", key, e);
                self.reply(message.chat.id, MSG_CANCELLED).await;
            }
        }
    }

    /// Free text only matters while a setup dialog is in progress
    async fn on_free_text(&self, message: &Message, key: AlertKey, text: &str) {
        let Some(reply) = self
            .dialogs
            .handle_input(key, text, &self.store, Utc::now())
        else {
            return;
        };

        match reply {
            DialogReply::PromptThreshold => self.reply(message.chat.id, MSG_PROMPT_THRESHOLD).await,
            DialogReply::InvalidThreshold => {
                self.reply(message.chat.id, MSG_INVALID_THRESHOLD).await
            }
            DialogReply::PromptInterval => self.reply(message.chat.id, MSG_PROMPT_INTERVAL).await,
            DialogReply::InvalidInterval => {
                self.reply(message.chat.id, MSG_INVALID_INTERVAL).await
            }
            DialogReply::Committed {
                threshold,
                interval_hours,
            } => {
                let confirmation = format!(
                    "Alert set:\nAPY: {threshold}%\nInterval: every {interval_hours} hour(s)"
                );
                self.reply(message.chat.id, &confirmation).await;
                self.send_test_report(message.chat.id, threshold).await;
            }
        }
    }

    /// Immediate check with live data; announces a zero-match outcome
    /// explicitly, unlike scheduled checks
    async fn send_test_report(&self, chat_id: i64, threshold: u32) {
        let text = match self.feed.fetch().await {
            Ok(snapshot) => {
                report::render(&snapshot, ReportKind::TestAlert, f64::from(threshold), None)
            }
            Err(e) => {
                warn!("test report fetch failed: {}", e);
                report::DATA_UNAVAILABLE.to_string()
            }
        };
        self.reply(chat_id, &text).await;
    }

    /// Authorization query; a transport failure denies rather than
    /// letting an unverifiable actor through
    async fn check_authorized(&self, message: &Message) -> bool {
        match self.telegram.is_authorized(message).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("admin check failed in chat {}: {}", message.chat.id, e);
                false
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.telegram.send_message(chat_id, text).await {
            warn!("failed to send message to chat {}: {}", chat_id, e);
        }
    }
}
