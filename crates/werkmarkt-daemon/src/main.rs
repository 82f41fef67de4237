//! Werkmarkt Daemon - marketplace lifecycle service
//!
//! The daemon serves the project engagement lifecycle over REST:
//! - posting catalog and proposal negotiation
//! - paid engagement state machine with revision tracking
//! - review gate and aggregate summaries
//! - escrow gateway bridge (checkout sessions, webhooks, payouts)

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod server;
mod storage;

use config::DaemonConfig;
use error::DaemonResult;
use server::Server;

/// Werkmarkt Daemon CLI
#[derive(Parser)]
#[command(name = "werkmarktd")]
#[command(about = "Werkmarkt daemon - services marketplace lifecycle engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WERKMARKT_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(
        short,
        long,
        env = "WERKMARKT_LISTEN_ADDR",
        default_value = "127.0.0.1:8080"
    )]
    listen: String,

    /// Log level
    #[arg(long, env = "WERKMARKT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "WERKMARKT_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| error::DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    config.server.listen_addr = cli
        .listen
        .parse()
        .map_err(|e| error::DaemonError::Config(format!("Invalid listen address: {}", e)))?;

    // Print startup banner
    println!(
        r#"
__      _____ ___ _  ___  __  _   ___ _  _____
\ \    / / __| _ \ |/ /  \/  |/_\ | _ \ |/ /_  _|
 \ \/\/ /| _||   / ' <| |\/| / _ \|   / ' <  | |
  \_/\_/ |___|_|_\_|\_\_|  |_\/ \_\_|_\_|\_\ |_|

  Werkmarkt - services marketplace lifecycle engine
  Version: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config);
    server.run().await
}
