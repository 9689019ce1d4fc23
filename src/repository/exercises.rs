// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise backlog repository.

use super::{new_id, Collection, LoadStatus, Record};
use crate::error::StorageError;
use crate::models::{Exercise, ExercisePatch, NewExercise};
use crate::storage::{keys, KeyValueStore};
use std::sync::Arc;

impl Record for Exercise {
    fn id(&self) -> &str {
        &self.id
    }
}

/// CRUD over the exercise backlog, stored under [`keys::EXERCISES`].
pub struct ExerciseRepository {
    collection: Collection<Exercise>,
}

impl ExerciseRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            collection: Collection::new(store, keys::EXERCISES),
        }
    }

    /// Load the backlog from storage.
    pub async fn load(&self) -> Result<(), StorageError> {
        self.collection.load().await
    }

    pub fn status(&self) -> LoadStatus {
        self.collection.status()
    }

    pub fn list(&self) -> Vec<Exercise> {
        self.collection.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Exercise> {
        self.collection.find(id)
    }

    /// Exercises whose name or muscle group contains `term`.
    pub fn search(&self, term: &str) -> Vec<Exercise> {
        self.collection.with_items(|items| {
            items
                .iter()
                .filter(|e| e.matches(term))
                .cloned()
                .collect()
        })
    }

    /// Add an exercise with a fresh id.
    pub async fn add(&self, data: NewExercise) -> Result<Exercise, StorageError> {
        let exercise = self.collection.insert(data.with_id(new_id())).await?;
        tracing::info!(id = %exercise.id, name = %exercise.name, "Exercise added");
        Ok(exercise)
    }

    /// Merge `patch` into the exercise with `id`. `None` if no such exercise.
    pub async fn update(
        &self,
        id: &str,
        patch: &ExercisePatch,
    ) -> Result<Option<Exercise>, StorageError> {
        let updated = self.collection.update_with(id, |e| patch.apply(e)).await?;
        if updated.is_none() {
            tracing::debug!(id, "Exercise update matched nothing");
        }
        Ok(updated)
    }

    /// Delete the exercise with `id`. Deleting an unknown id is not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.collection.remove(id).await?;
        tracing::info!(id, removed, "Exercise deleted");
        Ok(removed)
    }
}
