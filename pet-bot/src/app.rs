//! Assembly: builds the context and handler chain, and runs the bot or an offline render.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use dbot_core::{init_tracing, Bot};
use dbot_telegram::{run_repl, TelegramBotAdapter};
use handler_chain::HandlerChain;
use llm_client::{build_llm_client, EnvLlmConfig};
use tracing::info;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::handlers::{AiHandler, MembersAddedHandler};

/// Greeting first, then the AI turn.
pub fn build_chain(ctx: Arc<AppContext>) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(MembersAddedHandler::new(ctx.bot.clone())))
        .add_handler(Arc::new(AiHandler::new(ctx)))
}

/// Runs the bot until the process is stopped.
pub async fn run_bot(config: AppConfig) -> Result<()> {
    init_tracing(config.telegram.log_file())?;
    config.validate()?;

    let teloxide_bot = config.telegram.build_bot()?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let llm_config = EnvLlmConfig::from_env()?;
    let llm = build_llm_client(&llm_config);
    let ctx = Arc::new(AppContext::from_config(&config, bot, llm)?);

    info!(
        prompts_dir = %config.prompts_dir.display(),
        cards_dir = %config.cards_dir.display(),
        "step: starting pet bot"
    );
    run_repl(teloxide_bot, build_chain(ctx)).await
}

/// Renders the card template at `template` against the JSON at `data`.
pub fn render_files(template: &Path, data: &Path, pretty: bool) -> Result<String> {
    let template_text = fs::read_to_string(template)
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let data_text = fs::read_to_string(data)
        .with_context(|| format!("Failed to read data {}", data.display()))?;
    let rendered = card_renderer::render_str(&template_text, &data_text)?;
    if !pretty {
        return Ok(rendered);
    }
    let value: serde_json::Value = serde_json::from_str(&rendered)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
