//! Bot abstraction for sending text and cards.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it via teloxide, tests use recording fakes.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;
use serde_json::Value;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }
    /// Sends a rendered card (Adaptive Card JSON). Transports without card support degrade it to text.
    async fn send_card(&self, chat: &Chat, card: &Value) -> Result<()>;
}
