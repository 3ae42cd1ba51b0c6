//! Everything a turn needs, built once at startup and shared by `Arc`.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use dbot_core::Bot;
use llm_client::LlmClient;
use openapi_client::{OpenApiClient, OpenApiSpec, OperationInvoker};
use prompt::PromptManager;
use tracing::info;
use url::Url;

use crate::actions::ActionRegistry;
use crate::config::AppConfig;
use crate::template_cache::TemplateCache;

pub struct AppContext {
    pub bot: Arc<dyn Bot>,
    pub llm: Arc<dyn LlmClient>,
    pub prompts: PromptManager,
    pub default_prompt: String,
    pub invoker: Arc<dyn OperationInvoker>,
    pub templates: TemplateCache,
    pub actions: ActionRegistry,
}

impl AppContext {
    pub fn new(
        bot: Arc<dyn Bot>,
        llm: Arc<dyn LlmClient>,
        prompts: PromptManager,
        default_prompt: impl Into<String>,
        invoker: Arc<dyn OperationInvoker>,
        actions: ActionRegistry,
    ) -> Self {
        Self {
            bot,
            llm,
            prompts,
            default_prompt: default_prompt.into(),
            invoker,
            templates: TemplateCache::new(),
            actions,
        }
    }

    /// Loads the API document and the default prompt, and registers one card action per
    /// declared action with a matching operation.
    pub fn from_config(
        config: &AppConfig,
        bot: Arc<dyn Bot>,
        llm: Arc<dyn LlmClient>,
    ) -> Result<Self> {
        let spec = OpenApiSpec::from_file(&config.api_spec_path)
            .with_context(|| format!("Loading API document {}", config.api_spec_path.display()))?;
        let prompts = PromptManager::new(&config.prompts_dir);
        let prompt = prompts.load(&config.default_prompt)?;
        let actions = ActionRegistry::for_operations(&prompt.actions, &spec, &config.cards_dir);
        let client = api_client(spec, config.api_base_url.as_deref())?;
        info!(
            base_url = %client.base_url(),
            prompt = %config.default_prompt,
            actions = actions.len(),
            "step: app context built"
        );

        Ok(Self::new(
            bot,
            llm,
            prompts,
            config.default_prompt.clone(),
            Arc::new(client),
            actions,
        ))
    }
}

fn api_client(spec: OpenApiSpec, base_url: Option<&str>) -> Result<OpenApiClient> {
    let client = match base_url {
        Some(url) => {
            let url = Url::parse(url).with_context(|| format!("Invalid API_BASE_URL: {}", url))?;
            OpenApiClient::with_base_url(spec, url)?
        }
        None => OpenApiClient::new(spec)?,
    };
    Ok(client)
}
