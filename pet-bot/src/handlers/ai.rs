//! AI turn: prompt + planner + plan execution for text messages.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dbot_core::{Handler, HandlerError, HandlerResponse, Message};
use llm_client::{Plan, PlanCommand};
use prompt::{Prompt, PromptVariables, ACTIONS_VARIABLE};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::actions::{Action, ActionParameters};
use crate::context::AppContext;

/// Sent to the user when a turn fails for any reason.
pub const ERROR_REPLY: &str = "The bot encountered an error or bug.";

/// Runs one planner turn per text message and executes the resulting plan in order.
///
/// Errors never reach the chain: they are logged with their cause chain and the user
/// gets [`ERROR_REPLY`]. Only a failure to deliver that reply is returned.
pub struct AiHandler {
    ctx: Arc<AppContext>,
}

impl AiHandler {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Logs error and its cause chain. First item with `first_msg`, rest with "Caused by".
    fn log_error_chain(e: &anyhow::Error, first_msg: &str) {
        for (i, cause) in e.chain().enumerate() {
            if i == 0 {
                error!(cause = %cause, "{}", first_msg);
            } else {
                error!(cause = %cause, "Caused by");
            }
        }
    }

    async fn run_turn(&self, message: &Message) -> Result<()> {
        let prompt = self.ctx.prompts.load(&self.ctx.default_prompt)?;
        let variables = self.prompt_variables(&prompt).await?;
        let messages = prompt.messages(&variables, &message.content);

        let plan = self
            .ctx
            .llm
            .plan(messages, &prompt.actions, &prompt.config.completion)
            .await?;
        if plan.is_empty() {
            debug!(message_id = %message.id, "Planner returned an empty plan");
        }
        self.execute(message, plan).await
    }

    /// Binds `getActions` to the raw text of the prompt's actions file.
    async fn prompt_variables(&self, prompt: &Prompt) -> Result<PromptVariables> {
        let actions_text = if prompt.actions.is_empty() {
            "[]".to_string()
        } else {
            let path = self.ctx.prompts.actions_path(&prompt.name);
            self.ctx.templates.get(&path).await?.to_string()
        };
        let mut variables = PromptVariables::new();
        variables.insert(ACTIONS_VARIABLE.to_string(), actions_text);
        Ok(variables)
    }

    async fn run_action(
        &self,
        action: &dyn Action,
        message: &Message,
        parameters: Value,
    ) -> Result<String> {
        let parameters = ActionParameters::from_value(parameters)?;
        action.run(&self.ctx, message, parameters).await
    }

    async fn execute(&self, message: &Message, plan: Plan) -> Result<()> {
        for command in plan.commands {
            match command {
                PlanCommand::Say(text) => {
                    self.ctx.bot.send_message(&message.chat, &text).await?;
                }
                PlanCommand::DoAction { action, parameters } => {
                    let Some(handler) = self.ctx.actions.get(&action) else {
                        warn!(action = %action, known = ?self.ctx.actions.names(), "Planner chose an unknown action");
                        let text = format!("Sorry, I don't know how to do \"{}\".", action);
                        self.ctx.bot.send_message(&message.chat, &text).await?;
                        continue;
                    };
                    let status = self
                        .run_action(handler.as_ref(), message, parameters)
                        .await
                        .map_err(|e| HandlerError::Action {
                            action: action.clone(),
                            reason: format!("{:#}", e),
                        })?;
                    info!(action = %action, status = %status, "step: action finished");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Handler for AiHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> dbot_core::Result<HandlerResponse> {
        if !message.is_text() || message.content.trim().is_empty() {
            return Ok(HandlerResponse::Continue);
        }
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            "step: ai turn started"
        );

        match self.run_turn(message).await {
            Ok(()) => info!(user_id = message.user.id, "step: ai turn finished"),
            Err(e) => {
                Self::log_error_chain(&e, "AI turn failed");
                self.ctx.bot.send_message(&message.chat, ERROR_REPLY).await?;
            }
        }
        Ok(HandlerResponse::Stop)
    }
}
