//! Application config: Telegram settings plus the locations of prompts, cards and the API document.
//! Loaded from env PROMPTS_DIR, DEFAULT_PROMPT, CARDS_DIR, API_SPEC_PATH, API_BASE_URL.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use dbot_telegram::TelegramConfig;
use url::Url;

pub const DEFAULT_PROMPTS_DIR: &str = "prompts";
pub const DEFAULT_CARDS_DIR: &str = "adaptiveCards";
pub const DEFAULT_API_SPEC_PATH: &str = "appPackage/apiSpecificationFile/openapi.yaml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub prompts_dir: PathBuf,
    pub default_prompt: String,
    /// Card templates, one `<operationId>.json` per action.
    pub cards_dir: PathBuf,
    pub api_spec_path: PathBuf,
    /// Overrides the first `servers[].url` of the API document.
    pub api_base_url: Option<String>,
}

impl AppConfig {
    /// Loads from env. `token` overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = match token {
            Some(token) => TelegramConfig::with_token(token),
            None => TelegramConfig::from_env()?,
        };
        Ok(Self {
            telegram,
            prompts_dir: path_var("PROMPTS_DIR", DEFAULT_PROMPTS_DIR),
            default_prompt: var_or("DEFAULT_PROMPT", prompt::DEFAULT_PROMPT),
            cards_dir: path_var("CARDS_DIR", DEFAULT_CARDS_DIR),
            api_spec_path: path_var("API_SPEC_PATH", DEFAULT_API_SPEC_PATH),
            api_base_url: env::var("API_BASE_URL").ok().filter(|s| !s.trim().is_empty()),
        })
    }

    /// Checks values that would otherwise fail late, at the first message.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram.telegram_api_url {
            if Url::parse(url_str).is_err() {
                bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref url_str) = self.api_base_url {
            match Url::parse(url_str) {
                Ok(url) if !url.cannot_be_a_base() => {}
                _ => bail!("API_BASE_URL is set but not a valid base URL: {}", url_str),
            }
        }
        if self.default_prompt.trim().is_empty() {
            bail!("DEFAULT_PROMPT must not be empty");
        }
        Ok(())
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn path_var(name: &str, default: &str) -> PathBuf {
    PathBuf::from(var_or(name, default))
}
