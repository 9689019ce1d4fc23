// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Repositories over whole collections.
//!
//! Each collection is persisted as a single JSON array under one key.
//! Every mutation rewrites the full array; the in-memory copy changes only
//! after the store accepted the write.

pub mod exercises;
pub mod sessions;

pub use exercises::ExerciseRepository;
pub use sessions::SessionRepository;

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A record with a stable identifier.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Loading/error flags exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// In-memory mirror of one persisted collection.
pub struct Collection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    items: RwLock<Vec<T>>,
    status: RwLock<LoadStatus>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl<T: Record> Collection<T> {
    /// Empty collection; reports `loading` until the first [`load`](Self::load).
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            items: RwLock::new(Vec::new()),
            status: RwLock::new(LoadStatus {
                loading: true,
                error: None,
            }),
        }
    }

    /// Replace the in-memory copy with what the store holds.
    ///
    /// An absent key is an empty collection. On failure the in-memory copy
    /// is emptied and the error is recorded in the status; the store may now
    /// point at another identity, so the previous records must not be
    /// written back through it.
    pub async fn load(&self) -> Result<(), StorageError> {
        write(&self.status).loading = true;

        let result = match self.store.get(self.key).await {
            Ok(Some(value)) => serde_json::from_value::<Vec<T>>(value).map_err(|e| {
                tracing::error!(key = self.key, error = %e, "Stored collection has unexpected shape");
                StorageError::Load {
                    key: self.key.to_string(),
                }
            }),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(e),
        };

        let mut status = write(&self.status);
        status.loading = false;
        match result {
            Ok(items) => {
                tracing::debug!(key = self.key, count = items.len(), "Collection loaded");
                *write(&self.items) = items;
                status.error = None;
                Ok(())
            }
            Err(e) => {
                write(&self.items).clear();
                status.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn status(&self) -> LoadStatus {
        read(&self.status).clone()
    }

    /// Copy of the current in-memory collection.
    pub fn snapshot(&self) -> Vec<T> {
        read(&self.items).clone()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        read(&self.items).iter().find(|r| r.id() == id).cloned()
    }

    /// Run `f` against the in-memory collection without copying it.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&read(&self.items))
    }

    /// Persist `items` as the whole collection, then adopt it in memory.
    async fn persist(&self, items: Vec<T>) -> Result<(), StorageError> {
        let result = match serde_json::to_value(&items) {
            Ok(value) => self.store.set(self.key, value).await,
            Err(e) => {
                tracing::error!(key = self.key, error = %e, "Failed to serialize collection");
                Err(StorageError::Save {
                    key: self.key.to_string(),
                })
            }
        };

        match result {
            Ok(()) => {
                *write(&self.items) = items;
                write(&self.status).error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Collection not saved, keeping previous state");
                write(&self.status).error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Append a record.
    pub async fn insert(&self, record: T) -> Result<T, StorageError> {
        let mut items = self.snapshot();
        items.push(record.clone());
        self.persist(items).await?;
        Ok(record)
    }

    /// Replace the record matching `id` with `f(record)`.
    ///
    /// The collection is persisted even when nothing matches.
    pub async fn update_with(
        &self,
        id: &str,
        f: impl FnOnce(&T) -> T,
    ) -> Result<Option<T>, StorageError> {
        let mut items = self.snapshot();
        let updated = items.iter_mut().find(|r| r.id() == id).map(|r| {
            let next = f(&*r);
            *r = next;
            r.clone()
        });
        self.persist(items).await?;
        Ok(updated)
    }

    /// Remove the record matching `id`. Returns whether one was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut items = self.snapshot();
        let before = items.len();
        items.retain(|r| r.id() != id);
        let removed = items.len() != before;
        self.persist(items).await?;
        Ok(removed)
    }
}

/// Fresh opaque identifier for a new record.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
