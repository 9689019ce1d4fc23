// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend selection and failure mapping for the key-value store.

use serde_json::json;
use training_tracker::error::StorageError;
use training_tracker::storage::{KeyValueStore, LOCAL_PREFIX};

mod common;
use common::test_storage;

#[tokio::test]
async fn test_signed_out_round_trips_through_local_backend() {
    let storage = test_storage();

    storage.store.set("k", json!({"a": [1, 2]})).await.unwrap();

    assert_eq!(storage.store.get("k").await.unwrap(), Some(json!({"a": [1, 2]})));
    assert_eq!(
        storage.local.inner.raw(&format!("{LOCAL_PREFIX}k")).as_deref(),
        Some(r#"{"a":[1,2]}"#)
    );
    assert!(storage.remote.document("anyone", "k").is_none());
}

#[tokio::test]
async fn test_local_keys_are_namespaced() {
    let storage = test_storage();

    storage.store.set("exercises", json!([])).await.unwrap();

    assert_eq!(
        storage.local.inner.keys(),
        vec!["training-tracker-exercises".to_string()]
    );
}

#[tokio::test]
async fn test_missing_key_is_absent_not_error() {
    let storage = test_storage();
    assert_eq!(storage.store.get("nothing").await.unwrap(), None);

    storage.identity.sign_in("alice");
    assert_eq!(storage.store.get("nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_signed_in_round_trips_through_remote_backend() {
    let storage = test_storage();
    storage.identity.sign_in("alice");

    storage.store.set("k", json!([{"id": "x"}])).await.unwrap();

    assert_eq!(storage.store.get("k").await.unwrap(), Some(json!([{"id": "x"}])));
    let document = storage.remote.document("alice", "k").unwrap();
    assert_eq!(document.data, json!([{"id": "x"}]));
    assert!(document.updated_at.ends_with('Z'));
    assert!(storage.local.inner.keys().is_empty());
}

#[tokio::test]
async fn test_identities_do_not_see_each_other() {
    let storage = test_storage();

    storage.identity.sign_in("alice");
    storage.store.set("k", json!("alice's")).await.unwrap();

    storage.identity.sign_in("bob");
    assert_eq!(storage.store.get("k").await.unwrap(), None);
    storage.store.set("k", json!("bob's")).await.unwrap();

    storage.identity.sign_in("alice");
    assert_eq!(storage.store.get("k").await.unwrap(), Some(json!("alice's")));
}

#[tokio::test]
async fn test_identity_change_does_not_migrate_data() {
    let storage = test_storage();

    storage.store.set("k", json!(1)).await.unwrap();
    storage.identity.sign_in("alice");
    assert_eq!(storage.store.get("k").await.unwrap(), None);

    storage.identity.sign_out();
    assert_eq!(storage.store.get("k").await.unwrap(), Some(json!(1)));
}

#[tokio::test]
async fn test_remote_remove_writes_tombstone() {
    let storage = test_storage();
    storage.identity.sign_in("alice");
    storage.store.set("k", json!([1])).await.unwrap();

    storage.store.remove("k").await.unwrap();

    // Reads as absent, but the document still exists with a null payload
    assert_eq!(storage.store.get("k").await.unwrap(), None);
    let document = storage.remote.document("alice", "k").unwrap();
    assert!(document.data.is_null());
}

#[tokio::test]
async fn test_local_remove_deletes_key() {
    let storage = test_storage();
    storage.store.set("k", json!([1])).await.unwrap();

    storage.store.remove("k").await.unwrap();

    assert_eq!(storage.store.get("k").await.unwrap(), None);
    assert!(storage.local.inner.keys().is_empty());
}

#[tokio::test]
async fn test_failures_map_to_operation_category() {
    let storage = test_storage();

    storage.local.set_fail_writes(true);
    assert_eq!(
        storage.store.set("k", json!(1)).await,
        Err(StorageError::Save {
            key: "k".to_string()
        })
    );
    assert_eq!(
        storage.store.remove("k").await,
        Err(StorageError::Delete {
            key: "k".to_string()
        })
    );

    storage.local.set_fail_reads(true);
    assert_eq!(
        storage.store.get("k").await,
        Err(StorageError::Load {
            key: "k".to_string()
        })
    );
}

#[tokio::test]
async fn test_corrupt_local_value_is_load_failure() {
    use training_tracker::storage::LocalBackend;

    let storage = test_storage();
    storage
        .local
        .write("training-tracker-k", "{not json".to_string())
        .await
        .unwrap();

    let err = storage.store.get("k").await.unwrap_err();
    assert!(matches!(err, StorageError::Load { .. }));
    assert_eq!(err.key(), "k");
}

#[tokio::test]
async fn test_anonymous_provider_always_uses_local() {
    use std::sync::Arc;
    use training_tracker::identity::Anonymous;
    use training_tracker::storage::{MemoryBackend, MemoryDocumentBackend, Storage};

    let local = MemoryBackend::new();
    let remote = MemoryDocumentBackend::new();
    let store = Storage::new(
        Arc::new(local.clone()),
        Arc::new(remote.clone()),
        Arc::new(Anonymous),
    );

    store.set("exercises", json!([])).await.unwrap();

    assert_eq!(local.keys(), vec![format!("{LOCAL_PREFIX}exercises")]);
}
