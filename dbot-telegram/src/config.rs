//! Minimal Telegram config: token, API URL, log path.
//! Loaded from env BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE.

use std::env;

use anyhow::{Context, Result};

pub const DEFAULT_LOG_FILE: &str = "logs/pet-bot.log";

/// Telegram connectivity and logging settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
}

impl TelegramConfig {
    /// BOT_TOKEN required; TELEGRAM_API_URL and LOG_FILE optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").context("BOT_TOKEN not set")?;
        Ok(Self::with_token(bot_token))
    }

    /// Uses the given token; API URL and log file still come from the environment.
    pub fn with_token(bot_token: String) -> Self {
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        let log_file = env::var("LOG_FILE").ok().filter(|s| !s.trim().is_empty());
        Self {
            bot_token,
            telegram_api_url,
            log_file,
        }
    }

    pub fn log_file(&self) -> &str {
        self.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE)
    }

    /// teloxide Bot for this token, pointed at the custom API URL when one is set.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(&self.bot_token);
        match &self.telegram_api_url {
            Some(url) => {
                let url = reqwest::Url::parse(url)
                    .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", url))?;
                Ok(bot.set_api_url(url))
            }
            None => Ok(bot),
        }
    }
}
