//! SurrealDB repository implementations.

mod certificate;
mod certificate_request;
mod event;
mod secret;

pub use certificate::SurrealCertificateRepository;
pub use certificate_request::SurrealCertificateRequestRepository;
pub use event::SurrealEventRecorder;
pub use secret::SurrealSecretRepository;

use std::collections::BTreeMap;

use certsync_core::models::meta::{ObjectMeta, OwnerReference};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Shape of the `metadata` object column shared by every object table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredMeta {
    #[serde(default)]
    annotations: BTreeMap<String, String>,
    #[serde(default)]
    owner_references: Vec<OwnerReference>,
}

fn encode<T: Serialize>(kind: &str, value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::decode(kind, e))
}

fn decode<T: DeserializeOwned>(kind: &str, value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::decode(kind, e))
}

fn encode_meta(
    kind: &str,
    annotations: BTreeMap<String, String>,
    owner_references: Vec<OwnerReference>,
) -> Result<serde_json::Value, StoreError> {
    encode(
        kind,
        &StoredMeta {
            annotations,
            owner_references,
        },
    )
}

/// Columns every object row carries, turned back into [`ObjectMeta`].
struct MetaColumns {
    uid: Uuid,
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl MetaColumns {
    fn into_meta(self, kind: &str) -> Result<ObjectMeta, StoreError> {
        let stored: StoredMeta = if self.metadata.is_null() {
            StoredMeta::default()
        } else {
            decode(kind, self.metadata)?
        };
        Ok(ObjectMeta {
            namespace: self.namespace,
            name: self.name,
            uid: self.uid,
            annotations: stored.annotations,
            owner_references: stored.owner_references,
            created_at: self.created_at,
        })
    }
}

fn parse_uid(kind: &str, record_id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(record_id).map_err(|e| StoreError::decode(kind, format!("invalid UUID: {e}")))
}
