//! Telegram Bot API transport
//!
//! Sends reports, deletes superseded ones, answers the admin query,
//! and long-polls for inbound updates.


use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outbound delivery surface the scheduler depends on (allows mocking)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTML-formatted message; returns the new message id
    async fn send_report(&self, chat_id: i64, text: &str) -> Result<i64>;
    /// Delete a previously sent message
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;
}

/// An inbound update from `getUpdates`
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub my_chat_member: Option<ChatMemberUpdated>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    /// Present when a group admin posts anonymously as the group itself
    pub sender_chat: Option<Chat>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// The bot's own membership changing in some chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub new_chat_member: ChatMember,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(45))
            .build()
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
        })
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let resp: ApiResponse<Vec<Update>> = self
            .http
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .send()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?
            .json()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        Self::unwrap_response(resp)
    }

    /// Send an HTML message with link previews suppressed
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let url = format!("{}/sendMessage", self.base_url);
        let payload = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp: ApiResponse<SentMessage> = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?
            .json()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        Ok(Self::unwrap_response(resp)?.message_id)
    }

    /// Delete a message by id
    pub async fn delete(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let url = format!("{}/deleteMessage", self.base_url);
        let resp: ApiResponse<bool> = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }))
            .send()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?
            .json()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        Self::unwrap_response(resp)?;
        Ok(())
    }

    /// Whether the message's author may manage subscriptions here.
    ///
    /// Private chats are always allowed. In groups, anonymous admins
    /// post as the group itself; everyone else must hold administrator
    /// or creator status.
    pub async fn is_authorized(&self, message: &Message) -> Result<bool> {
        if message.chat.is_private() {
            return Ok(true);
        }

        if let Some(sender_chat) = &message.sender_chat {
            if sender_chat.id == message.chat.id {
                return Ok(true);
            }
        }

        let Some(from) = &message.from else {
            return Ok(false);
        };

        let url = format!("{}/getChatMember", self.base_url);
        let resp: ApiResponse<ChatMember> = self
            .http
            .get(&url)
            .query(&[
                ("chat_id", message.chat.id.to_string()),
                ("user_id", from.id.to_string()),
            ])
            .send()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?
            .json()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        let member = Self::unwrap_response(resp)?;
        Ok(member.status == "administrator" || member.status == "creator")
    }

    fn unwrap_response<T>(resp: ApiResponse<T>) -> Result<T> {
        if !resp.ok {
            return Err(BotError::Delivery(
                resp.description
                    .unwrap_or_else(|| "telegram api error".to_string()),
            ));
        }
        resp.result
            .ok_or_else(|| BotError::Delivery("telegram api returned no result".to_string()))
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_report(&self, chat_id: i64, text: &str) -> Result<i64> {
        self.send_message(chat_id, text).await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.delete(chat_id, message_id).await
    }
}
