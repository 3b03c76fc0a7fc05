// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo Board API Server
//!
//! Serves the shared todo list, image uploads and the uploaded images
//! themselves, over either the in-memory or the Firestore backend.

use std::sync::Arc;
use todo_board::{config::Config, db::Backend, services::LocalAssetStore, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting Todo Board API"
    );

    // Storage backend is fixed for the life of the process
    let backend = Backend::connect(&config).await?;

    let assets = LocalAssetStore::new(&config.upload_dir).await?;
    tracing::info!(path = %assets.dir().display(), "Upload directory ready");

    let state = Arc::new(AppState::new(config.clone(), backend, Arc::new(assets)));

    // Build router
    let app = todo_board::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("todo_board=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
