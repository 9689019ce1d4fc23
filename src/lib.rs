// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training Tracker: plan workouts from an exercise backlog and record
//! sets during a live session.
//!
//! Data is kept locally while signed out and in a per-user document store
//! while signed in.

pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use error::StorageError;
use identity::SessionIdentity;
use repository::{ExerciseRepository, SessionRepository};
use services::SessionLifecycle;
use std::sync::Arc;
use storage::KeyValueStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<SessionIdentity>,
    pub exercises: Arc<ExerciseRepository>,
    pub sessions: Arc<SessionRepository>,
    pub lifecycle: SessionLifecycle,
}

impl AppState {
    /// Build state over `store`. Collections are empty until [`reload`](Self::reload).
    pub fn new(
        config: Config,
        identity: Arc<SessionIdentity>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let exercises = Arc::new(ExerciseRepository::new(store.clone()));
        let sessions = Arc::new(SessionRepository::new(store));
        let lifecycle = SessionLifecycle::new(sessions.clone());
        Self {
            config,
            identity,
            exercises,
            sessions,
            lifecycle,
        }
    }

    /// Load both collections from whichever backend is current.
    pub async fn reload(&self) -> Result<(), StorageError> {
        let (exercises, sessions) = tokio::join!(self.exercises.load(), self.sessions.load());
        exercises?;
        sessions
    }
}
