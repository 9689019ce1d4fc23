// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training Tracker API Server
//!
//! Serves the exercise backlog and training sessions to the UI, storing
//! them locally or per user depending on who is signed in.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use training_tracker::{
    config::Config,
    identity::SessionIdentity,
    storage::{FileBackend, FirestoreDb, Storage},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Training Tracker API");

    // Local backend (signed out)
    let local = FileBackend::new(&config.data_dir);
    tracing::info!(path = %local.root().display(), "Local storage ready");

    // Remote backend (signed in)
    let remote = match &config.gcp_project_id {
        Some(project_id) => FirestoreDb::new(project_id)
            .await
            .expect("Failed to connect to Firestore"),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, remote storage is offline");
            FirestoreDb::new_offline()
        }
    };

    tracing::info!(connected = remote.is_connected(), "Remote storage ready");

    let identity = Arc::new(SessionIdentity::new());
    let storage = Storage::new(Arc::new(local), Arc::new(remote), identity.clone());

    // Build shared state and load both collections once
    let state = Arc::new(AppState::new(config.clone(), identity, Arc::new(storage)));
    if let Err(e) = state.reload().await {
        // Serve anyway; the UI reads the error from /api/status
        tracing::error!(error = %e, "Initial load failed");
    }
    tracing::info!(
        exercises = state.exercises.list().len(),
        sessions = state.sessions.list().len(),
        "Collections loaded"
    );

    // Build router
    let app = training_tracker::routes::create_router(state);

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
                .add_directive("training_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
