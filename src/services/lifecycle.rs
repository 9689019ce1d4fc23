// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: start, record sets, complete.
//!
//! Each operation reads the session from the repository, builds the next
//! session value, and persists it with one whole-session `update`. No edits
//! are batched.

use crate::error::{AppError, Result};
use crate::models::{SessionError, SessionPatch, SessionStatus, SetEdit, TrainingSession};
use crate::repository::SessionRepository;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of completing a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub session: TrainingSession,
    /// Sets not marked complete at the time of completion (soft warning)
    pub incomplete_sets: usize,
}

/// Checked state transitions on top of [`SessionRepository`].
#[derive(Clone)]
pub struct SessionLifecycle {
    sessions: Arc<SessionRepository>,
    /// Held across the single-active check and the save in `start`
    start_lock: Arc<Mutex<()>>,
}

impl SessionLifecycle {
    pub fn new(sessions: Arc<SessionRepository>) -> Self {
        Self {
            sessions,
            start_lock: Arc::new(Mutex::new(())),
        }
    }

    fn find(&self, id: &str) -> Result<TrainingSession> {
        self.sessions
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    fn ensure_transition(session: &TrainingSession, next: SessionStatus) -> Result<()> {
        if !session.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                to: next,
            }
            .into());
        }
        Ok(())
    }

    async fn save(&self, id: &str, patch: &SessionPatch) -> Result<TrainingSession> {
        self.sessions
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    /// Move a planned session to in-progress.
    ///
    /// Refused while a different session is already in progress. Starts
    /// through this lifecycle are serialized; a raw
    /// [`SessionRepository::update`] can still bypass the check.
    pub async fn start(&self, id: &str) -> Result<TrainingSession> {
        let _guard = self.start_lock.lock().await;
        let session = self.find(id)?;
        Self::ensure_transition(&session, SessionStatus::InProgress)?;

        if let Some(active) = self.sessions.query_active() {
            if active.id != id {
                return Err(SessionError::AnotherSessionActive(active.id).into());
            }
        }

        let started = self
            .save(id, &SessionPatch::status(SessionStatus::InProgress))
            .await?;
        tracing::info!(id, date = %started.date, "Session started");
        Ok(started)
    }

    /// Apply one set edit to an in-progress session.
    pub async fn record_set(
        &self,
        id: &str,
        exercise: usize,
        set: usize,
        edit: &SetEdit,
    ) -> Result<TrainingSession> {
        let session = self.find(id)?;
        if session.status != SessionStatus::InProgress {
            return Err(AppError::BadRequest(format!(
                "Session {} is {}, sets can only be recorded while in progress",
                id, session.status
            )));
        }

        let edited = session.with_set_edit(exercise, set, edit)?;
        let saved = self.save(id, &SessionPatch::replace_with(&edited)).await?;
        tracing::debug!(id, exercise, set, edit = ?edit, "Set recorded");
        Ok(saved)
    }

    /// Finish an in-progress session, attaching `notes`.
    ///
    /// Always allowed; unfinished sets are reported, not rejected.
    pub async fn complete(&self, id: &str, notes: Option<String>) -> Result<CompletionOutcome> {
        let session = self.find(id)?;
        Self::ensure_transition(&session, SessionStatus::Completed)?;

        let incomplete_sets = session.incomplete_sets();
        if !session.all_sets_completed() {
            tracing::warn!(id, incomplete_sets, "Completing session with unfinished sets");
        }

        let patch = SessionPatch {
            status: Some(SessionStatus::Completed),
            notes: Some(notes.filter(|n| !n.trim().is_empty())),
            ..Default::default()
        };
        let completed = self.save(id, &patch).await?;
        tracing::info!(id, "Session completed");

        Ok(CompletionOutcome {
            session: completed,
            incomplete_sets,
        })
    }
}
