//! # pet-bot
//!
//! Telegram bot for the Petstore API. Each text message goes through a prompt and the
//! LLM planner; planned actions call a REST operation and answer with the response
//! rendered into an Adaptive Card (flattened to text on Telegram).
//!
//! ## External interactions
//!
//! - **Telegram**: via dbot-telegram ([`app::run_bot`]).
//! - **LLM**: OpenAI or Azure OpenAI via llm-client.
//! - **REST API**: operations of `openapi.yaml` via openapi-client.
//! - **Filesystem**: prompts, card templates and the API document, read at startup or
//!   on first use.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod context;
pub mod handlers;
pub mod template_cache;

pub use actions::{Action, ActionParameters, ActionRegistry, ApiCardAction};
pub use app::{build_chain, render_files, run_bot};
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use context::AppContext;
pub use handlers::{AiHandler, MembersAddedHandler, ERROR_REPLY, GREETING};
pub use template_cache::TemplateCache;
