//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] planner trait and an OpenAI / Azure OpenAI implementation.
//! A planner receives the conversation and the actions the bot can perform and answers
//! with a [`Plan`]: an ordered list of things to say and actions to run.
//! Transport-agnostic; used by pet-bot's AI handler.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, Completion,
};
use prompt::{ActionDefinition, ChatMessage, CompletionConfig, MessageRole};
use serde_json::Value;
use tracing::warn;

mod config;
mod openai_llm;

pub use config::{AzureSettings, EnvLlmConfig, LlmConfig};
pub use openai_llm::OpenAILlmClient;

/// One step of a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanCommand {
    /// Send this text to the user.
    Say(String),
    /// Run the named action. `parameters` is the JSON object the model produced.
    DoAction { action: String, parameters: Value },
}

/// Commands in the order the model produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub commands: Vec<PlanCommand>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Planner interface.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Asks the model what to do next. `actions` are offered as callable functions.
    async fn plan(
        &self,
        messages: Vec<ChatMessage>,
        actions: &[ActionDefinition],
        options: &CompletionConfig,
    ) -> Result<Plan>;
}

/// Builds the planner selected by `config` (Azure when Azure settings are present).
pub fn build_llm_client(config: &dyn LlmConfig) -> Arc<dyn LlmClient> {
    let client = match config.azure() {
        Some(azure) => OpenAILlmClient::azure(
            config.api_key().to_string(),
            azure.endpoint.clone(),
            azure.deployment.clone(),
            azure.api_version.clone(),
        ),
        None => OpenAILlmClient::with_base_url(
            config.api_key().to_string(),
            config.base_url().to_string(),
        ),
    };
    Arc::new(client.with_model(config.model().to_string()))
}

/// Turns a completion into a plan: text first, then one DoAction per tool call.
/// Arguments that are not a JSON object become `{}`.
pub fn plan_from_completion(completion: Completion) -> Plan {
    let mut commands = Vec::with_capacity(completion.tool_calls.len() + 1);
    if let Some(text) = completion.content {
        commands.push(PlanCommand::Say(text));
    }
    for call in completion.tool_calls {
        let parameters = match serde_json::from_str::<Value>(&call.arguments) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                warn!(
                    action = %call.name,
                    arguments = %call.arguments,
                    "Tool call arguments are not a JSON object, using {{}}"
                );
                Value::Object(Default::default())
            }
        };
        commands.push(PlanCommand::DoAction {
            action: call.name,
            parameters,
        });
    }
    Plan { commands }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}
