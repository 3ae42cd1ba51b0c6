//! # dbot-telegram
//!
//! Telegram transport: adapters, [`dbot_core::Bot`] implementation, minimal config, REPL runner.
//! Handles only Telegram connectivity and handler-chain execution. Telegram has no card
//! rendering, so cards are sent as plain text built by [`card_to_text`].

mod adapters;
mod bot_adapter;
mod card_text;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper, MESSAGE_TYPE_OTHER};
pub use bot_adapter::TelegramBotAdapter;
pub use card_text::card_to_text;
pub use config::TelegramConfig;
pub use runner::run_repl;
