//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion with function tools, against
//! either OpenAI (or a compatible endpoint) or an Azure OpenAI deployment.
//! Provides token masking for safe logging.

use std::sync::Arc;

use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::types::{
    ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    FunctionObjectArgs,
};
use async_openai::Client;
use serde_json::Value;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If the key has 11 characters or fewer, returns "***" so no part of it leaks.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    if len <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// A function the model may call. `parameters` is a JSON Schema object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A function call chosen by the model. `arguments` is the raw JSON text it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
}

/// First choice of a completion: assistant text and/or tool calls, in model order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// Sampling options; `None` leaves the service default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

#[derive(Clone)]
enum Backend {
    OpenAi(Arc<Client<OpenAIConfig>>),
    Azure(Arc<Client<AzureConfig>>),
}

/// Chat client. Holds the API key only for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    backend: Backend,
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.clone());
        Self {
            backend: Backend::OpenAi(Arc::new(Client::with_config(config))),
            api_key_for_logging: api_key,
        }
    }

    /// Builds a client with a custom base URL (proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self {
            backend: Backend::OpenAi(Arc::new(Client::with_config(config))),
            api_key_for_logging: api_key,
        }
    }

    /// Builds a client for an Azure OpenAI deployment. The deployment, not the request's
    /// model name, decides which model answers.
    pub fn azure(api_key: String, endpoint: String, deployment: String, api_version: String) -> Self {
        let config = AzureConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(endpoint)
            .with_deployment_id(deployment)
            .with_api_version(api_version);
        Self {
            backend: Backend::Azure(Arc::new(Client::with_config(config))),
            api_key_for_logging: api_key,
        }
    }

    pub fn is_azure(&self) -> bool {
        matches!(self.backend, Backend::Azure(_))
    }

    /// Sends one chat completion request offering `tools` and returns the first choice.
    ///
    /// Logs the masked API key, request JSON and token usage. Errors when the response
    /// has no choices.
    pub async fn chat_completion_with_tools(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: &[ToolSpec],
        options: ChatOptions,
    ) -> anyhow::Result<Completion> {
        tracing::info!(
            model = %model,
            message_count = messages.len(),
            tool_count = tools.len(),
            azure = self.is_azure(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI chat_completion request"
        );

        let request = build_request(model, messages, tools, options)?;
        if let Ok(json) = serde_json::to_string_pretty(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = match &self.backend {
            Backend::OpenAi(client) => client.chat().create(request).await?,
            Backend::Azure(client) => client.chat().create(request).await?,
        };

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        first_completion(response)
    }
}

fn build_request(
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    tools: &[ToolSpec],
    options: ChatOptions,
) -> anyhow::Result<CreateChatCompletionRequest> {
    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(model).messages(messages);
    if !tools.is_empty() {
        args.tools(
            tools
                .iter()
                .map(to_tool)
                .collect::<anyhow::Result<Vec<ChatCompletionTool>>>()?,
        );
    }
    if let Some(max_tokens) = options.max_tokens {
        // Azure api versions before 2024-09 reject max_completion_tokens.
        #[allow(deprecated)]
        args.max_tokens(max_tokens);
    }
    if let Some(temperature) = options.temperature {
        args.temperature(temperature);
    }
    if let Some(top_p) = options.top_p {
        args.top_p(top_p);
    }
    Ok(args.build()?)
}

fn to_tool(spec: &ToolSpec) -> anyhow::Result<ChatCompletionTool> {
    let function = FunctionObjectArgs::default()
        .name(spec.name.clone())
        .description(spec.description.clone())
        .parameters(spec.parameters.clone())
        .build()?;
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(function)
        .build()?)
}

fn first_completion(response: CreateChatCompletionResponse) -> anyhow::Result<Completion> {
    let Some(choice) = response.choices.into_iter().next() else {
        anyhow::bail!("No response from OpenAI");
    };
    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();
    Ok(Completion {
        content: choice.message.content.filter(|text| !text.trim().is_empty()),
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_build_request_without_tools_omits_tools_field() {
        let request =
            build_request("gpt-4o-mini", vec![user("hi")], &[], ChatOptions::default()).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_build_request_with_tools_and_options() {
        let tools = vec![ToolSpec {
            name: "getPetById".to_string(),
            description: "Find pet by ID".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];
        let options = ChatOptions {
            max_tokens: Some(800),
            temperature: Some(0.0),
            top_p: None,
        };
        let request = build_request("gpt-4o-mini", vec![user("pet 1")], &tools, options).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "getPetById");
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_first_completion_collects_tool_calls() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "getPetById", "arguments": "{\"path\":{\"petId\":1}}"}
                    }]
                }
            }]
        }))
        .unwrap();

        let completion = first_completion(response).unwrap();
        assert_eq!(completion.content, None);
        assert_eq!(
            completion.tool_calls,
            vec![ToolCall {
                name: "getPetById".to_string(),
                arguments: "{\"path\":{\"petId\":1}}".to_string(),
            }]
        );
    }

    #[test]
    fn test_azure_client_reports_backend() {
        let client = OpenAIClient::azure(
            "key".to_string(),
            "https://example.openai.azure.com".to_string(),
            "gpt-4o".to_string(),
            "2024-08-01-preview".to_string(),
        );
        assert!(client.is_azure());
        assert!(!OpenAIClient::new("key".to_string()).is_azure());
    }
}
