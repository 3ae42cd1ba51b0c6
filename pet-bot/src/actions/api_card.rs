//! Calls one REST operation and answers with its response rendered into a card.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use dbot_core::Message;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{Action, ActionParameters};
use crate::context::AppContext;

pub const ACTION_SUCCESS: &str = "success";

/// On a 2xx response the body is rendered into the card at `card` and sent; on any
/// other status the user gets the status reason phrase.
#[derive(Debug, Clone)]
pub struct ApiCardAction {
    operation_id: String,
    card: PathBuf,
}

impl ApiCardAction {
    pub fn new(operation_id: impl Into<String>, card: impl Into<PathBuf>) -> Self {
        Self {
            operation_id: operation_id.into(),
            card: card.into(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }
}

#[async_trait]
impl Action for ApiCardAction {
    #[instrument(skip(self, ctx, message, parameters), fields(operation = %self.operation_id))]
    async fn run(
        &self,
        ctx: &AppContext,
        message: &Message,
        parameters: ActionParameters,
    ) -> Result<String> {
        let request = parameters.into_request();
        let response = ctx
            .invoker
            .invoke(&self.operation_id, &request)
            .await
            .with_context(|| format!("Operation {} failed", self.operation_id))?;

        if !response.is_success() {
            warn!(status = response.status, reason = %response.reason, "step: operation returned non-success");
            let text = if response.reason.is_empty() {
                format!("Request failed with status {}", response.status)
            } else {
                response.reason.clone()
            };
            ctx.bot.send_message(&message.chat, &text).await?;
            return Ok(ACTION_SUCCESS.to_string());
        }

        let template = ctx.templates.get(&self.card).await?;
        let rendered = card_renderer::render_str(&template, &response.body)
            .with_context(|| format!("Rendering card {}", self.card.display()))?;
        let card: Value = serde_json::from_str(&rendered)?;
        ctx.bot.send_card(&message.chat, &card).await?;
        info!(
            chat_id = message.chat.id,
            card = %self.card.display(),
            "step: card sent"
        );
        Ok(ACTION_SUCCESS.to_string())
    }
}
