//! # Prompt
//!
//! Loads prompt folders and turns them into chat messages for the planner.
//!
//! ## Layout
//!
//! ```text
//! prompts/
//!   chat/
//!     skprompt.txt   system prompt text with {{variable}} slots
//!     config.json    optional completion settings (max_tokens, temperature, top_p)
//!     actions.json   optional action (function) definitions offered to the model
//! ```
//!
//! ## External interactions
//!
//! - **Filesystem**: [`PromptManager::load`] reads the folder.
//! - **AI models**: [`Prompt::messages`] output is sent to the LLM by llm-client.

mod manager;

pub use manager::{ActionDefinition, CompletionConfig, Prompt, PromptConfig, PromptManager, PromptVariables};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Name of the prompt used when none is configured.
pub const DEFAULT_PROMPT: &str = "chat";

/// Variable bound to the raw text of the prompt's `actions.json`.
pub const ACTIONS_VARIABLE: &str = "getActions";
