//! Discord front-end.
//!
//! Registers the `issuecredential` and `checkverification` slash commands
//! and forwards them to the credential backend over HTTP. The bot holds no
//! chain credentials of its own.

pub mod backend;
pub mod commands;
pub mod handler;

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use serenity::all::{ApplicationId, Client, GatewayIntents, GuildId};
use tracing::info;

use crate::config::BotConfig;
use backend::BackendClient;
use handler::Handler;

/// Connects to the Discord gateway and serves slash commands until the
/// connection ends.
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let backend = BackendClient::new(
        reqwest::Client::new(),
        config.backend_issue_url.clone(),
        config.backend_check_url.clone(),
    );
    let handler = Handler::new(backend, GuildId::new(config.guild_id));

    let mut builder = Client::builder(config.discord_token.expose_secret(), GatewayIntents::GUILDS)
        .event_handler(handler);
    if let Some(application_id) = config.application_id {
        builder = builder.application_id(ApplicationId::new(application_id));
    }

    let mut client = builder.await.context("Failed to create Discord client")?;
    info!(guild_id = config.guild_id, "Starting Discord bot");
    client.start().await.context("Discord client stopped")?;
    Ok(())
}
