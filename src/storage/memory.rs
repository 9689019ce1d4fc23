// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory backends for tests and ephemeral runs.

use super::{DocumentBackend, LocalBackend, StoredDocument};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Local backend holding raw text in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text, bypassing the storage router.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

#[async_trait]
impl LocalBackend for MemoryBackend {
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.raw(key))
    }

    async fn write(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Remote backend keyed by `(identity, key)`.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentBackend {
    documents: Arc<DashMap<(String, String), StoredDocument>>,
}

impl MemoryDocumentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored document, including tombstones.
    pub fn document(&self, identity: &str, key: &str) -> Option<StoredDocument> {
        self.documents
            .get(&(identity.to_string(), key.to_string()))
            .map(|d| d.value().clone())
    }
}

#[async_trait]
impl DocumentBackend for MemoryDocumentBackend {
    async fn get_document(
        &self,
        identity: &str,
        key: &str,
    ) -> anyhow::Result<Option<StoredDocument>> {
        Ok(self.document(identity, key))
    }

    async fn set_document(
        &self,
        identity: &str,
        key: &str,
        document: &StoredDocument,
    ) -> anyhow::Result<()> {
        self.documents
            .insert((identity.to_string(), key.to_string()), document.clone());
        Ok(())
    }
}
