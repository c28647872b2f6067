//! Courier gateway client entry point
//!
//! Run with:
//! ```bash
//! COURIER_TOKEN=... cargo run -p courier-gateway
//! ```
//!
//! Configuration is loaded from environment variables. Replies `pong` to `!ping`.

use courier_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use courier_gateway::{
    GatewayClient, HttpRequestClient, MessageCreateEvent, Session, SessionConfig,
    WebSocketTransport,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Gateway client failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        api = %config.api.base_url,
        intents = %config.gateway.intents,
        "Starting gateway client"
    );

    let rest = Arc::new(HttpRequestClient::from_config(&config)?);
    let (session, client) = Session::new(
        SessionConfig::from(&config),
        rest,
        Arc::new(WebSocketTransport::new()),
    );

    let replies = client.clone();
    client.register_command("ping", move |payload, _| reply_pong(&replies, payload))?;
    client.on_event("GUILD_CREATE", |payload| {
        info!(guild = %payload["name"].as_str().unwrap_or("?"), "Guild available");
    })?;

    let task = session.spawn().await?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    client.shutdown()?;
    task.await?;

    Ok(())
}

fn reply_pong(client: &GatewayClient, payload: Value) {
    let message: MessageCreateEvent = match serde_json::from_value(payload) {
        Ok(message) => message,
        Err(e) => {
            error!(error = %e, "Command payload is not a message");
            return;
        }
    };
    let channel_id = message.channel_id;
    let client = client.clone();

    tokio::spawn(async move {
        if let Err(e) = client.create_message(channel_id, "pong").await {
            error!(%channel_id, error = %e, "Failed to reply to ping");
        }
    });
}
