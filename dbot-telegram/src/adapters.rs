//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{
    Chat, Message, MessageDirection, ToCoreMessage, ToCoreUser, User, MESSAGE_TYPE_MEMBERS_ADDED,
    MESSAGE_TYPE_TEXT,
};

/// `message_type` of anything that is neither text nor a member join (photos, stickers, ...).
pub const MESSAGE_TYPE_OTHER: &str = "other";

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
            is_bot: self.0.is_bot,
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
///
/// Text messages become [`MESSAGE_TYPE_TEXT`]; service messages announcing new chat
/// members become [`MESSAGE_TYPE_MEMBERS_ADDED`] with `members_added` filled.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let members_added: Vec<User> = self
            .0
            .new_chat_members()
            .map(|members| members.iter().map(|u| TelegramUserWrapper(u).to_core()).collect())
            .unwrap_or_default();
        let message_type = if !members_added.is_empty() {
            MESSAGE_TYPE_MEMBERS_ADDED
        } else if self.0.text().is_some() {
            MESSAGE_TYPE_TEXT
        } else {
            MESSAGE_TYPE_OTHER
        };

        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                    is_bot: false,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: self.0.text().unwrap_or("").to_string(),
            message_type: message_type.to_string(),
            direction: MessageDirection::Incoming,
            created_at: self.0.date,
            members_added,
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else {
            "channel"
        }
    }
}
