// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bulk-Tracker API Server
//!
//! Serves the weight-gain configuration, onboarding, photo and meal
//! progress endpoints for the mobile app.

use bulk_tracker::{config::Config, db, services::WeightConfigStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Bulk-Tracker API"
    );

    // Open the key-value store
    let store = db::connect(&config).await?;
    let weight_config = WeightConfigStore::new(store);

    // Log what we start from; a broken store shows up here rather than on
    // the first request.
    match weight_config.try_load_weight_config().await {
        Ok(current) => tracing::info!(
            current_weight = current.current_weight,
            daily_target = current.daily_target,
            "Weight config loaded"
        ),
        Err(e) => tracing::warn!(error = %e, "Store not readable at startup"),
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        weight_config,
    });

    // Build router
    let app = bulk_tracker::routes::create_router(state);

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

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bulk_tracker=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
