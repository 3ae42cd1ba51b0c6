//! LLM configuration: trait and env-based implementation.

use std::env;

use anyhow::{Context, Result};

use crate::openai_llm::DEFAULT_MODEL;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";

/// Azure OpenAI deployment coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
}

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    /// Ignored when [`LlmConfig::azure`] is set.
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn azure(&self) -> Option<&AzureSettings>;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub azure: Option<AzureSettings>,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.api_key
    }
    fn base_url(&self) -> &str {
        &self.base_url
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn azure(&self) -> Option<&AzureSettings> {
        self.azure.as_ref()
    }
}

impl EnvLlmConfig {
    /// Load from environment variables. A non-empty `AZURE_OPENAI_API_KEY` selects Azure
    /// (endpoint and deployment name then required); otherwise `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        if let Some(api_key) = non_empty_var("AZURE_OPENAI_API_KEY") {
            let endpoint = non_empty_var("AZURE_OPENAI_ENDPOINT")
                .context("AZURE_OPENAI_ENDPOINT not set")?;
            let deployment = non_empty_var("AZURE_OPENAI_MODEL_DEPLOYMENT_NAME")
                .context("AZURE_OPENAI_MODEL_DEPLOYMENT_NAME not set")?;
            let api_version = non_empty_var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string());
            return Ok(Self {
                api_key,
                base_url,
                model: deployment.clone(),
                azure: Some(AzureSettings {
                    endpoint,
                    deployment,
                    api_version,
                }),
            });
        }

        let api_key = non_empty_var("OPENAI_API_KEY")
            .context("Neither AZURE_OPENAI_API_KEY nor OPENAI_API_KEY is set")?;
        let model = non_empty_var("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
            azure: None,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}
