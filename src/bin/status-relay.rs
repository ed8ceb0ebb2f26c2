// ABOUTME: Server binary exposing the session status stream over HTTP
// ABOUTME: Loads environment configuration, initializes logging and serves until ctrl-c
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Status Relay Server Binary
//!
//! Starts the HTTP server hosting the analysis status stream and health check.
//! The session store lives in-process; producers share it by embedding the
//! library instead of running this binary.

use anyhow::Result;
use clap::Parser;
use status_relay::{
    config::ServerConfig, logging, resources::ServerResources, routes::build_router,
    store::SessionStore,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "status-relay")]
#[command(about = "Session status relay - streams analysis progress over Server-Sent Events")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_for_server(&config)?;

    info!("Starting status relay");
    info!("{}", config.summary());

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(SessionStore::new(), config.clone()));
    let app = build_router(resources.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        resources.shutdown();
        return Err(e.into());
    }

    resources.shutdown();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
