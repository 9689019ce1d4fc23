// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value storage with two interchangeable backends.
//!
//! - Local: device-persistent store, keys namespaced with [`LOCAL_PREFIX`]
//! - Remote: per-identity document store at `users/{identity}/data/{key}`
//!
//! [`Storage`] picks the backend on every call from the current identity.
//! Nothing is migrated when the identity changes.

pub mod firestore;
pub mod local;
pub mod memory;

pub use firestore::FirestoreDb;
pub use local::FileBackend;
pub use memory::{MemoryBackend, MemoryDocumentBackend};

use crate::error::StorageError;
use crate::identity::IdentityProvider;
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Namespace for keys written to the local backend.
pub const LOCAL_PREFIX: &str = "training-tracker-";

/// Logical keys, one per persisted collection.
pub mod keys {
    pub const EXERCISES: &str = "exercises";
    pub const SESSIONS: &str = "training-sessions";
}

/// Async get/set/remove over JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value under `key`; `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing what was there.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove `key`.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Raw text store used while signed out.
#[async_trait]
pub trait LocalBackend: Send + Sync {
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn write(&self, key: &str, value: String) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Payload wrapper written to the remote backend.
///
/// `data` is `null` for a removed key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub data: Value,
    pub updated_at: String,
}

/// Per-identity document store used while signed in.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn get_document(&self, identity: &str, key: &str)
        -> anyhow::Result<Option<StoredDocument>>;

    async fn set_document(
        &self,
        identity: &str,
        key: &str,
        document: &StoredDocument,
    ) -> anyhow::Result<()>;
}

/// Backend chosen for a single call.
enum Target {
    Local,
    Remote(String),
}

/// Identity-aware router over a local and a remote backend.
#[derive(Clone)]
pub struct Storage {
    local: Arc<dyn LocalBackend>,
    remote: Arc<dyn DocumentBackend>,
    identity: Arc<dyn IdentityProvider>,
}

impl Storage {
    pub fn new(
        local: Arc<dyn LocalBackend>,
        remote: Arc<dyn DocumentBackend>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            local,
            remote,
            identity,
        }
    }

    fn target(&self) -> Target {
        match self.identity.current_identity() {
            Some(identity) => Target::Remote(identity),
            None => Target::Local,
        }
    }

    fn local_key(key: &str) -> String {
        format!("{LOCAL_PREFIX}{key}")
    }

    fn tombstone() -> StoredDocument {
        StoredDocument {
            data: Value::Null,
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        }
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let load_failed = || StorageError::Load {
            key: key.to_string(),
        };

        match self.target() {
            Target::Local => {
                let raw = self
                    .local
                    .read(&Self::local_key(key))
                    .await
                    .map_err(|e| {
                        tracing::error!(key, backend = "local", error = %e, "Storage get failed");
                        load_failed()
                    })?;

                raw.map(|text| {
                    serde_json::from_str(&text).map_err(|e| {
                        tracing::error!(key, backend = "local", error = %e, "Stored value is not valid JSON");
                        load_failed()
                    })
                })
                .transpose()
            }
            Target::Remote(identity) => {
                let document = self
                    .remote
                    .get_document(&identity, key)
                    .await
                    .map_err(|e| {
                        tracing::error!(key, backend = "remote", error = %e, "Storage get failed");
                        load_failed()
                    })?;

                Ok(document.map(|d| d.data).filter(|data| !data.is_null()))
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let save_failed = || StorageError::Save {
            key: key.to_string(),
        };

        match self.target() {
            Target::Local => {
                let serialized = serde_json::to_string(&value).map_err(|e| {
                    tracing::error!(key, backend = "local", error = %e, "Failed to serialize value");
                    save_failed()
                })?;
                self.local
                    .write(&Self::local_key(key), serialized)
                    .await
                    .map_err(|e| {
                        tracing::error!(key, backend = "local", error = %e, "Storage set failed");
                        save_failed()
                    })
            }
            Target::Remote(identity) => {
                let document = StoredDocument {
                    data: value,
                    updated_at: format_utc_rfc3339(chrono::Utc::now()),
                };
                self.remote
                    .set_document(&identity, key, &document)
                    .await
                    .map_err(|e| {
                        tracing::error!(key, backend = "remote", error = %e, "Storage set failed");
                        save_failed()
                    })
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let delete_failed = || StorageError::Delete {
            key: key.to_string(),
        };

        match self.target() {
            Target::Local => self
                .local
                .delete(&Self::local_key(key))
                .await
                .map_err(|e| {
                    tracing::error!(key, backend = "local", error = %e, "Storage remove failed");
                    delete_failed()
                }),
            // The remote document is overwritten with a null payload, not deleted.
            Target::Remote(identity) => self
                .remote
                .set_document(&identity, key, &Self::tombstone())
                .await
                .map_err(|e| {
                    tracing::error!(key, backend = "remote", error = %e, "Storage remove failed");
                    delete_failed()
                }),
        }
    }
}
