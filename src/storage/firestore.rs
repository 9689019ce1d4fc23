// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed per-identity document store.
//!
//! Documents live at `users/{identity}/data/{key}`.

use super::{DocumentBackend, StoredDocument};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parent collection holding one document per identity.
const USERS: &str = "users";
/// Sub-collection holding one document per storage key.
const DATA: &str = "data";

/// On-the-wire document shape.
///
/// The payload is kept as JSON text so nested collections round-trip
/// without Firestore's value-type coercions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreRecord {
    data: Option<String>,
    updated_at: String,
}

impl FirestoreRecord {
    fn from_document(document: &StoredDocument) -> anyhow::Result<Self> {
        let data = if document.data.is_null() {
            None
        } else {
            Some(serde_json::to_string(&document.data)?)
        };
        Ok(Self {
            data,
            updated_at: document.updated_at.clone(),
        })
    }

    fn into_document(self) -> anyhow::Result<StoredDocument> {
        let data = match self.data {
            Some(text) => serde_json::from_str(&text)?,
            None => serde_json::Value::Null,
        };
        Ok(StoredDocument {
            data,
            updated_at: self.updated_at,
        })
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> anyhow::Result<Self> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to Firestore: {}", e))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> anyhow::Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Firestore Emulator: {}", e))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client.
    ///
    /// All operations fail; used when no project is configured.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> anyhow::Result<&firestore::FirestoreDb> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Database not connected (offline mode)"))
    }
}

#[async_trait]
impl DocumentBackend for FirestoreDb {
    async fn get_document(
        &self,
        identity: &str,
        key: &str,
    ) -> anyhow::Result<Option<StoredDocument>> {
        let client = self.get_client()?;
        let parent_path = client.parent_path(USERS, identity)?;

        let record: Option<FirestoreRecord> = client
            .fluent()
            .select()
            .by_id_in(DATA)
            .parent(&parent_path)
            .obj()
            .one(key)
            .await?;

        record.map(FirestoreRecord::into_document).transpose()
    }

    async fn set_document(
        &self,
        identity: &str,
        key: &str,
        document: &StoredDocument,
    ) -> anyhow::Result<()> {
        let client = self.get_client()?;
        let parent_path = client.parent_path(USERS, identity)?;
        let record = FirestoreRecord::from_document(document)?;

        let _: () = client
            .fluent()
            .update()
            .in_col(DATA)
            .document_id(key)
            .parent(&parent_path)
            .object(&record)
            .execute()
            .await?;

        tracing::debug!(identity, key, "Remote document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_tombstone_as_none() {
        let document = StoredDocument {
            data: serde_json::Value::Null,
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let record = FirestoreRecord::from_document(&document).unwrap();
        assert!(record.data.is_none());
        assert_eq!(record.into_document().unwrap(), document);
    }

    #[test]
    fn test_record_preserves_nested_payload() {
        let document = StoredDocument {
            data: json!([{"id": "a", "sets": [{"weight": 12.5}]}]),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let record = FirestoreRecord::from_document(&document).unwrap();
        assert_eq!(record.into_document().unwrap(), document);
    }

    #[tokio::test]
    async fn test_offline_client_fails() {
        let db = FirestoreDb::new_offline();
        assert!(!db.is_connected());
        assert!(db.get_document("u", "k").await.is_err());
    }
}
