// src/discord/handler.rs

use serenity::all::{
    CommandInteraction, Context, EditInteractionResponse, EventHandler, GuildId, Interaction,
    Ready,
};
use serenity::async_trait;
use tracing::{error, info, warn};

use super::{
    backend::BackendClient,
    commands::{self, ADDRESS_OPTION, CHECK_VERIFICATION, CREDENTIAL_OPTION, ISSUE_CREDENTIAL},
};

pub struct Handler {
    backend: BackendClient,
    guild_id: GuildId,
}

impl Handler {
    pub fn new(backend: BackendClient, guild_id: GuildId) -> Self {
        Self { backend, guild_id }
    }

    async fn issue_credential(&self, address: &str, credential: &str) -> String {
        match self.backend.issue_credential(address, credential).await {
            Ok(result) => commands::issue_reply(address, &result),
            Err(e) => {
                error!("Error issuing credential: {:#}", e);
                commands::ISSUE_FAILED_REPLY.to_string()
            }
        }
    }

    async fn check_verification(&self, address: &str) -> String {
        match self.backend.check_verification(address).await {
            Ok(result) => commands::verification_reply(address, &result),
            Err(e) => {
                error!("Error checking verification: {:#}", e);
                commands::CHECK_FAILED_REPLY.to_string()
            }
        }
    }
}

fn string_option<'a>(command: &'a CommandInteraction, name: &str) -> &'a str {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
        .unwrap_or_default()
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        info!("Registering slash commands...");
        match self
            .guild_id
            .set_commands(&ctx.http, commands::definitions())
            .await
        {
            Ok(registered) => info!(
                count = registered.len(),
                "Slash commands registered successfully"
            ),
            Err(e) => error!("Error registering commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        if command.data.name != ISSUE_CREDENTIAL && command.data.name != CHECK_VERIFICATION {
            warn!(name = %command.data.name, "Ignoring unknown command");
            return;
        }

        if let Err(e) = command.defer(&ctx.http).await {
            error!("Failed to defer reply: {}", e);
            return;
        }

        let address = string_option(&command, ADDRESS_OPTION);
        let content = if command.data.name == ISSUE_CREDENTIAL {
            let credential = string_option(&command, CREDENTIAL_OPTION);
            self.issue_credential(address, credential).await
        } else {
            self.check_verification(address).await
        };

        if let Err(e) = command
            .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
            .await
        {
            error!("Failed to send reply: {}", e);
        }
    }
}
