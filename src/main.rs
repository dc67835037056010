//! LAN Transfer Server - Entry Point
//!
//! Lets a phone and a PC on the same network exchange files through a
//! shared upload folder.

use env_logger::Env;
use log::{error, info};
use std::process;

use lan_transfer_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default filter
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Launching transfer server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped: {}", e);
        process::exit(1);
    }
}
