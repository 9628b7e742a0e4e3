//! Soccer Agent - autonomous players for a 2D soccer simulation server
//!
//! Launches up to two teams of agents against one server. Each agent:
//! - Connects over its own UDP socket and completes the startup handshake
//! - Tracks the world from the server's perceptions and referee calls
//! - Plans and sends one action per simulation step

mod agent;
mod config;
mod game;
mod net;
mod planner;
mod util;

use futures::future::join_all;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting soccer agents");
    info!(
        server = %config.server_addr,
        left = config.left.size,
        left_formation = %config.left.formation,
        right = config.right.size,
        right_formation = %config.right.formation,
        "Roster"
    );

    let agents = agent::launch(&config);
    let handles: Vec<_> = agents.iter().map(|h| h.abort_handle()).collect();

    tokio::select! {
        _ = join_all(agents) => {
            info!("All agents stopped");
        }
        _ = shutdown_signal() => {
            for handle in handles {
                handle.abort();
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping agents");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping agents");
        }
    }
}
