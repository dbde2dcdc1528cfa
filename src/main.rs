// src/main.rs

use std::env;

use humanity_credentials::{
    api::create_router,
    config::{BotConfig, Config},
    discord::run_bot,
    AppState,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 HTTP Server listening on {}", addr);

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

// --- Discord Bot Logic ---
async fn run_discord() {
    let config = match BotConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load bot configuration: {:#}", e);
            return;
        }
    };

    info!("🚀 Starting Discord bot...");
    if let Err(e) = run_bot(config).await {
        error!("❌ Discord bot stopped: {:#}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "humanity_credentials=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Run the bot (--discord) or the HTTP backend
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--discord".to_string()) || env::var("DISCORD_MODE").is_ok() {
        run_discord().await;
        return;
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let app_state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize credential service: {:#}", e);
            return;
        }
    };

    if let Err(e) = run_http_server(app_state).await {
        error!("❌ HTTP server error: {:#}", e);
    }
}
