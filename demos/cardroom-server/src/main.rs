use std::time::Duration;

use cardroom::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Lobby and relay server for four-seat card games.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CARDROOM_BIND", default_value = cardroom::DEFAULT_BIND)]
    bind: String,

    /// Seconds a connection may stay silent before it is dropped
    #[arg(long, env = "CARDROOM_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    idle_timeout_secs: u64,

    /// AI strategy for lobbies created without one
    #[arg(long, env = "CARDROOM_DEFAULT_AI_STRATEGY", default_value = "Family")]
    default_ai_strategy: String,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), CardroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let server = CardroomServer::builder()
        .bind(&args.bind)
        .idle_timeout(Duration::from_secs(args.idle_timeout_secs))
        .lobby_config(LobbyConfig {
            default_ai_strategy: args.default_ai_strategy,
        })
        .build()
        .await?;

    tracing::info!(
        bind = %args.bind,
        idle_timeout_secs = args.idle_timeout_secs,
        "configured"
    );
    server.run().await
}
