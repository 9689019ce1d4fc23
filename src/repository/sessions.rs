// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training session repository.

use super::{new_id, Collection, LoadStatus, Record};
use crate::error::StorageError;
use crate::models::{NewSession, SessionPatch, SessionStatus, TrainingSession};
use crate::storage::{keys, KeyValueStore};
use crate::time_utils::week_range;
use chrono::NaiveDate;
use std::sync::Arc;

impl Record for TrainingSession {
    fn id(&self) -> &str {
        &self.id
    }
}

/// CRUD and queries over training sessions, stored under [`keys::SESSIONS`].
///
/// The repository does not enforce a single in-progress session; see
/// [`SessionLifecycle`](crate::services::SessionLifecycle) for checked
/// transitions.
pub struct SessionRepository {
    collection: Collection<TrainingSession>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            collection: Collection::new(store, keys::SESSIONS),
        }
    }

    pub async fn load(&self) -> Result<(), StorageError> {
        self.collection.load().await
    }

    pub fn status(&self) -> LoadStatus {
        self.collection.status()
    }

    pub fn list(&self) -> Vec<TrainingSession> {
        self.collection.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<TrainingSession> {
        self.collection.find(id)
    }

    /// Schedule a session. Status is always `planned`.
    pub async fn add(&self, data: NewSession) -> Result<TrainingSession, StorageError> {
        let session = self.collection.insert(data.with_id(new_id())).await?;
        tracing::info!(id = %session.id, date = %session.date, "Session planned");
        Ok(session)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &SessionPatch,
    ) -> Result<Option<TrainingSession>, StorageError> {
        let updated = self.collection.update_with(id, |s| patch.apply(s)).await?;
        if let Some(session) = &updated {
            tracing::debug!(id, status = %session.status, "Session updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.collection.remove(id).await?;
        tracing::info!(id, removed, "Session deleted");
        Ok(removed)
    }

    /// All sessions on `date`, in collection order.
    pub fn query_by_date(&self, date: NaiveDate) -> Vec<TrainingSession> {
        self.collection.with_items(|items| {
            items.iter().filter(|s| s.date == date).cloned().collect()
        })
    }

    /// All sessions in the Monday-Sunday week containing `date`.
    pub fn query_week(&self, date: NaiveDate) -> Vec<TrainingSession> {
        let (start, end) = week_range(date);
        self.collection.with_items(|items| {
            items
                .iter()
                .filter(|s| s.date >= start && s.date <= end)
                .cloned()
                .collect()
        })
    }

    /// First session (in collection order) that is in progress.
    pub fn query_active(&self) -> Option<TrainingSession> {
        self.collection.with_items(|items| {
            items
                .iter()
                .find(|s| s.status == SessionStatus::InProgress)
                .cloned()
        })
    }
}
