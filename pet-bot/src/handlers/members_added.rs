use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use tracing::info;

pub const GREETING: &str = "How can I help you today?";

/// Greets the chat once per member-join update.
pub struct MembersAddedHandler {
    bot: Arc<dyn Bot>,
}

impl MembersAddedHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for MembersAddedHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_members_added() {
            return Ok(HandlerResponse::Continue);
        }
        info!(
            chat_id = message.chat.id,
            members = message.members_added.len(),
            "step: members added, sending greeting"
        );
        self.bot.send_message(&message.chat, GREETING).await?;
        Ok(HandlerResponse::Reply(GREETING.to_string()))
    }
}
