//! pet-bot: entry point.

use anyhow::Result;
use clap::Parser;
use pet_bot::{render_files, run_bot, AppConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = AppConfig::load(token)?;
            run_bot(config).await
        }
        Commands::Render {
            template,
            data,
            pretty,
        } => {
            println!("{}", render_files(&template, &data, pretty)?);
            Ok(())
        }
    }
}
