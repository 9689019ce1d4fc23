// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use training_tracker::config::Config;
use training_tracker::identity::SessionIdentity;
use training_tracker::routes::create_router;
use training_tracker::storage::{
    DocumentBackend, FirestoreDb, KeyValueStore, LocalBackend, MemoryBackend,
    MemoryDocumentBackend, Storage, StoredDocument,
};
use training_tracker::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Local backend whose writes fail while `fail_writes` is set.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyBackend {
    pub inner: MemoryBackend,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_reads: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyBackend {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocalBackend for FlakyBackend {
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("simulated read failure");
        }
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: String) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated quota exceeded");
        }
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated delete failure");
        }
        self.inner.delete(key).await
    }
}

/// Remote backend whose reads fail while `fail_reads` is set.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyDocumentBackend {
    pub inner: MemoryDocumentBackend,
    pub fail_reads: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyDocumentBackend {
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self, identity: &str, key: &str) -> Option<StoredDocument> {
        self.inner.document(identity, key)
    }
}

#[async_trait]
impl DocumentBackend for FlakyDocumentBackend {
    async fn get_document(
        &self,
        identity: &str,
        key: &str,
    ) -> anyhow::Result<Option<StoredDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("simulated network failure");
        }
        self.inner.get_document(identity, key).await
    }

    async fn set_document(
        &self,
        identity: &str,
        key: &str,
        document: &StoredDocument,
    ) -> anyhow::Result<()> {
        self.inner.set_document(identity, key, document).await
    }
}

/// Storage wired to in-memory backends, plus handles to inspect them.
#[allow(dead_code)]
pub struct TestStorage {
    pub store: Arc<dyn KeyValueStore>,
    pub local: FlakyBackend,
    pub remote: FlakyDocumentBackend,
    pub identity: Arc<SessionIdentity>,
}

#[allow(dead_code)]
pub fn test_storage() -> TestStorage {
    let local = FlakyBackend::default();
    let remote = FlakyDocumentBackend::default();
    let identity = Arc::new(SessionIdentity::new());
    let store = Arc::new(Storage::new(
        Arc::new(local.clone()),
        Arc::new(remote.clone()),
        identity.clone(),
    ));
    TestStorage {
        store,
        local,
        remote,
        identity,
    }
}

/// Create a test app over in-memory backends.
/// Returns the router, the shared state, and the storage handles.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, TestStorage) {
    let storage = test_storage();
    let state = Arc::new(AppState::new(
        Config::test_default(),
        storage.identity.clone(),
        storage.store.clone(),
    ));
    state.reload().await.expect("Initial load failed");
    (create_router(state.clone()), state, storage)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(identity: &str, signing_key: &[u8]) -> String {
    training_tracker::identity::create_jwt(identity, signing_key).unwrap()
}
