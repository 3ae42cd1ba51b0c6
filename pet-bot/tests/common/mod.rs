//! Shared fakes for pet-bot integration tests: a recording Bot, a canned OperationInvoker
//! and a scripted planner. None of them touch the network.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, Message, MessageDirection, User, MESSAGE_TYPE_MEMBERS_ADDED, MESSAGE_TYPE_TEXT};
use llm_client::{LlmClient, Plan, PlanCommand};
use openapi_client::{ApiError, ApiResponse, OperationInvoker, OperationRequest};
use pet_bot::{ActionRegistry, AppContext};
use prompt::{ActionDefinition, ChatMessage, CompletionConfig, PromptManager};
use serde_json::{json, Value};

/// Crate directory holding `prompts/`, `adaptiveCards/` and `appPackage/`.
pub fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn pet_json() -> Value {
    json!({
        "id": 1,
        "name": "Rex",
        "category": {"id": 1, "name": "Dogs"},
        "photoUrls": ["https://img.example/rex.png"],
        "tags": [{"id": 1, "name": "friendly"}],
        "status": "available"
    })
}

fn user() -> User {
    User {
        id: 123,
        username: Some("pet_owner".to_string()),
        first_name: Some("Pat".to_string()),
        last_name: None,
        is_bot: false,
    }
}

pub fn text_message(content: &str) -> Message {
    Message {
        id: "msg_1".to_string(),
        user: user(),
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: MESSAGE_TYPE_TEXT.to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
        members_added: Vec::new(),
    }
}

pub fn members_added_message() -> Message {
    let mut message = text_message("");
    message.message_type = MESSAGE_TYPE_MEMBERS_ADDED.to_string();
    message.members_added = vec![User {
        id: 7,
        username: None,
        first_name: Some("Sam".to_string()),
        last_name: None,
        is_bot: false,
    }];
    message
}

/// What the bot was asked to send, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(i64, String),
    Card(i64, Value),
}

#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingBot {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> dbot_core::Result<()> {
        if self.fail {
            return Err(dbot_core::DbotError::Bot("telegram unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Text(chat.id, text.to_string()));
        Ok(())
    }

    async fn send_card(&self, chat: &Chat, card: &Value) -> dbot_core::Result<()> {
        if self.fail {
            return Err(dbot_core::DbotError::Bot("telegram unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Card(chat.id, card.clone()));
        Ok(())
    }
}

/// Answers every operation with the same response and records the calls.
pub struct CannedInvoker {
    pub response: Option<ApiResponse>,
    pub calls: Mutex<Vec<(String, OperationRequest)>>,
}

impl CannedInvoker {
    pub fn new(status: u16, reason: &str, body: &str) -> Self {
        Self {
            response: Some(ApiResponse {
                status,
                reason: reason.to_string(),
                body: body.to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as an unknown operation.
    pub fn unreachable() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, OperationRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OperationInvoker for CannedInvoker {
    async fn invoke(
        &self,
        operation_id: &str,
        request: &OperationRequest,
    ) -> openapi_client::Result<ApiResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((operation_id.to_string(), request.clone()));
        self.response
            .clone()
            .ok_or_else(|| ApiError::UnknownOperation(operation_id.to_string()))
    }
}

/// Returns a fixed plan (or fails) and records what it was asked.
pub struct ScriptedPlanner {
    pub plan: Option<Vec<PlanCommand>>,
    pub seen_messages: Mutex<Vec<ChatMessage>>,
    pub seen_actions: Mutex<Vec<String>>,
    pub seen_options: Mutex<Option<CompletionConfig>>,
}

impl ScriptedPlanner {
    pub fn new(commands: Vec<PlanCommand>) -> Self {
        Self {
            plan: Some(commands),
            seen_messages: Mutex::new(Vec::new()),
            seen_actions: Mutex::new(Vec::new()),
            seen_options: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            plan: None,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedPlanner {
    async fn plan(
        &self,
        messages: Vec<ChatMessage>,
        actions: &[ActionDefinition],
        options: &CompletionConfig,
    ) -> anyhow::Result<Plan> {
        *self.seen_messages.lock().unwrap() = messages;
        *self.seen_actions.lock().unwrap() = actions.iter().map(|a| a.name.clone()).collect();
        *self.seen_options.lock().unwrap() = Some(options.clone());
        match &self.plan {
            Some(commands) => Ok(Plan {
                commands: commands.clone(),
            }),
            None => Err(anyhow!("model deployment not found")
                .context("OpenAI chat_completion request failed")),
        }
    }
}

pub fn get_pet(pet_id: Value) -> PlanCommand {
    PlanCommand::DoAction {
        action: "getPetById".to_string(),
        parameters: json!({"path": {"petId": pet_id}}),
    }
}

/// Context over the crate's real prompt, card and API document.
pub fn app_context(
    bot: Arc<RecordingBot>,
    planner: Arc<ScriptedPlanner>,
    invoker: Arc<CannedInvoker>,
) -> Arc<AppContext> {
    let assets = assets_dir();
    let spec = openapi_client::OpenApiSpec::from_file(
        assets.join("appPackage/apiSpecificationFile/openapi.yaml"),
    )
    .unwrap();
    let prompts = PromptManager::new(assets.join("prompts"));
    let prompt = prompts.load("chat").unwrap();
    let actions =
        ActionRegistry::for_operations(&prompt.actions, &spec, &assets.join("adaptiveCards"));

    Arc::new(AppContext::new(bot, planner, prompts, "chat", invoker, actions))
}
