//! OpenAI-backed planner: every action definition is offered as a function tool.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{ChatOptions, OpenAIClient, ToolSpec};
use prompt::{ActionDefinition, ChatMessage, CompletionConfig};
use tracing::{info, instrument};

use super::{chat_message_to_openai, plan_from_completion, LlmClient, Plan};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// [`LlmClient`] over openai-client function calling.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: OpenAIClient,
    model: String,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: OpenAIClient::with_base_url(api_key, base_url),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Azure deployment; the model name defaults to the deployment name.
    pub fn azure(api_key: String, endpoint: String, deployment: String, api_version: String) -> Self {
        Self {
            model: deployment.clone(),
            client: OpenAIClient::azure(api_key, endpoint, deployment, api_version),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_tool_spec(action: &ActionDefinition) -> ToolSpec {
    ToolSpec {
        name: action.name.clone(),
        description: action.description.clone(),
        parameters: action.parameters.clone(),
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, actions, options), fields(model = %self.model))]
    async fn plan(
        &self,
        messages: Vec<ChatMessage>,
        actions: &[ActionDefinition],
        options: &CompletionConfig,
    ) -> Result<Plan> {
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>>>()?;
        let tools: Vec<ToolSpec> = actions.iter().map(to_tool_spec).collect();
        let chat_options = ChatOptions {
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let completion = self
            .client
            .chat_completion_with_tools(&self.model, openai_messages, &tools, chat_options)
            .await?;
        let plan = plan_from_completion(completion);
        info!(commands = plan.commands.len(), "step: plan created");
        Ok(plan)
    }
}
