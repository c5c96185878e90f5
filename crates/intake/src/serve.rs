// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `intake serve` command implementation.
//!
//! Bootstraps storage (migrations run before the server accepts requests),
//! constructs the broadcaster and gateway state, and serves until ctrl-c.

use std::sync::Arc;

use tracing::{error, info};

use intake_bus::Broadcaster;
use intake_config::IntakeConfig;
use intake_core::IntakeError;
use intake_gateway::{start_server, GatewayState, ServerConfig};
use intake_storage::Database;

/// Runs the `intake serve` command.
///
/// The storage handle and broadcaster are constructed once here and passed
/// into the gateway state; request handlers never reach for globals.
pub async fn run_serve(config: IntakeConfig) -> Result<(), IntakeError> {
    init_tracing(&config.server.log_level);

    info!("starting intake serve");

    // Schema bootstrap happens inside open(). A failure here is fatal: the
    // server never starts accepting requests against a broken schema.
    let db = Database::open(&config.storage.database_path)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                path = config.storage.database_path.as_str(),
                "failed to open database"
            );
            e
        })?;
    info!(path = config.storage.database_path.as_str(), "database ready");

    let broadcaster = Arc::new(Broadcaster::new());

    let state = GatewayState {
        db: db.clone(),
        broadcaster,
        db_path: config.storage.database_path.clone(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    tokio::select! {
        result = start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    db.close().await?;
    info!("database connection closed");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// workspace crates with everything else capped at warn.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,intake={log_level},intake_gateway={log_level},intake_storage={log_level},intake_bus={log_level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
