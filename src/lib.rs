pub mod bot;
pub mod config;
pub mod error;
pub mod phrases;
pub mod retry;
pub mod session;
pub mod stream;
pub mod trigger;
pub mod types;

use std::sync::Arc;

use log::{debug, info};

use bot::Bot;
use config::Config;
use error::Result;
use phrases::{PhraseCatalog, RandomPicker};

/// Runs the bot: start, scripted stop, one restart, then listen until Ctrl-C.
///
/// # Errors
///
/// Returns configuration and handshake errors, and any error that ends a
/// listen loop.
pub async fn run(token: String) -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env(token)?;

    let picker = Arc::new(RandomPicker::new(PhraseCatalog::shakespearean()));
    let bot = Arc::new(Bot::from_config(&config, picker)?);

    bot.start().await?;

    if let Some(delay) = config.stop_after {
        debug!("Scheduling scripted stop in {delay:?}");
        let bot = Arc::clone(&bot);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("Stopping");
            bot.stop().await;
        });
    }

    if listen_until_shutdown(&bot).await? || !config.restart {
        return Ok(());
    }

    info!("Starting bot again");
    bot.start().await?;
    listen_until_shutdown(&bot).await?;

    Ok(())
}

/// Listens until the loop ends or Ctrl-C arrives. Returns `true` on Ctrl-C.
async fn listen_until_shutdown(bot: &Bot) -> Result<bool> {
    tokio::select! {
        result = bot.listen_and_respond() => {
            result?;
            Ok(false)
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
            bot.stop().await;
            Ok(true)
        }
    }
}
