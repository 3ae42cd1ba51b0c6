//! Command line: run the bot, or render a card offline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pet-bot")]
#[command(about = "Petstore Telegram bot: run, render", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Render a card template against a JSON data file and print the card.
    Render {
        #[arg(short, long)]
        template: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// Pretty-print the rendered card.
        #[arg(long)]
        pretty: bool,
    },
}
