// crates/chatline-daemon/src/main.rs
//
// Binary entrypoint for the Chatline chat server.
//
// Parses CLI arguments, loads configuration, initializes tracing, builds the
// shared chat store, and serves gRPC until Ctrl-C.

mod config;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;

use chatline_rpc::ChatRpcServer;
use chatline_store::ChatStore;

/// Chatline daemon: serves the chat.ChatServer gRPC service.
#[derive(Parser, Debug)]
#[command(name = "chatline-daemon", version = "0.1.0", about = "Chatline chat server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "chatline.toml")]
    config: String,

    /// Port to listen on; overrides the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Tracing is not up yet, so hold on to the load error and report it below.
    let (mut daemon_config, load_error) = match DaemonConfig::load(&args.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e.to_string())),
    };

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", args.config),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            args.config,
            e
        ),
    }

    if let Some(port) = args.port {
        daemon_config.rpc_port = port;
    }

    tracing::info!("Chatline Daemon v0.1.0");
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Stream buffer: {}", daemon_config.stream_buffer);

    let store = Arc::new(ChatStore::new());
    let server = ChatRpcServer::new(daemon_config.rpc_config(), store);

    let result = server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl-C, shutting down");
        })
        .await;

    if let Err(e) = result {
        tracing::error!("RPC server failed: {}", e);
        return Err(e);
    }

    tracing::info!("Chatline daemon stopped");
    Ok(())
}
