//! Library Server - Entry Point
//!
//! A browser-facing file manager: HTTP + JSON endpoints to list, read,
//! edit, delete, and upload files under a single library root.

use log::{error, info};

use library_server::Server;
use library_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching library server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::bind(config).await;
    server.start().await;
}
