// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

use std::{env, net::SocketAddr};

use tracing_subscriber::EnvFilter;

use embervault::api::router;
use embervault::config::{
    DATA_DIR_ENV, SEED_ACTIVE_WINDOW_MS_ENV, SEED_MAX_UNLOCKS_ENV, SEED_PASSWORD_ENV,
    SEED_SECRET_ENV,
};
use embervault::state::AppState;
use embervault::storage::{paths::DATA_ROOT, FileStorage, StoragePaths};
use embervault::vault::{Gatekeeper, ProvisionError, ProvisionOptions};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Provision a disclosure from the environment at boot.
///
/// Only fires when no disclosure state exists yet; a cleared installation
/// is never silently re-armed.
fn seed_from_env(gatekeeper: &Gatekeeper) {
    let (Ok(secret), Ok(password)) =
        (env::var(SEED_SECRET_ENV), env::var(SEED_PASSWORD_ENV))
    else {
        return;
    };

    let mut options = ProvisionOptions::default();
    if let Some(max_unlocks) = env::var(SEED_MAX_UNLOCKS_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
    {
        options.max_unlocks = max_unlocks;
    }
    if let Some(window_ms) = env::var(SEED_ACTIVE_WINDOW_MS_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
    {
        options.active_window_ms = window_ms;
    }

    match gatekeeper.provision(secret.as_bytes(), &password, &options) {
        Ok(()) => tracing::info!(
            max_unlocks = options.max_unlocks,
            active_window_ms = options.active_window_ms,
            "seeded disclosure from environment"
        ),
        Err(ProvisionError::AlreadyProvisioned) => {
            tracing::debug!("disclosure already provisioned, seed skipped")
        }
        Err(e) => tracing::error!(error = %e, "failed to seed disclosure"),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DATA_ROOT.to_string());
    let mut storage = FileStorage::new(StoragePaths::new(&data_dir));
    storage
        .initialize()
        .expect("Failed to create data directory");

    let gatekeeper = Gatekeeper::new(storage);
    seed_from_env(&gatekeeper);

    let state = AppState::new(gatekeeper);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, %data_dir, "Embervault listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}
