//! SurrealDB implementation of [`SecretRepository`].

use std::collections::BTreeMap;

use certsync_core::encoding::{decode_bytes, encode_bytes};
use certsync_core::error::CertsyncResult;
use certsync_core::models::secret::{NewSecret, Secret};
use certsync_core::repository::SecretRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{MetaColumns, decode, encode, encode_meta, parse_uid};
use crate::error::StoreError;

const SECRET_KIND: &str = "Secret";

#[derive(Debug, SurrealValue)]
struct SecretRow {
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl SecretRow {
    fn into_secret(self, uid: Uuid) -> Result<Secret, StoreError> {
        let meta = MetaColumns {
            uid,
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            created_at: self.created_at,
        }
        .into_meta(SECRET_KIND)?;
        let encoded: BTreeMap<String, String> = if self.data.is_null() {
            BTreeMap::new()
        } else {
            decode(SECRET_KIND, self.data)?
        };
        let data = encoded
            .into_iter()
            .map(|(key, value)| {
                decode_bytes(&value)
                    .map(|bytes| (key, bytes))
                    .map_err(|e| StoreError::decode(SECRET_KIND, e))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Secret { meta, data })
    }
}

#[derive(Debug, SurrealValue)]
struct SecretRowWithId {
    record_id: String,
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl SecretRowWithId {
    fn try_into_secret(self) -> Result<Secret, StoreError> {
        let uid = parse_uid(SECRET_KIND, &self.record_id)?;
        SecretRow {
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            data: self.data,
            created_at: self.created_at,
        }
        .into_secret(uid)
    }
}

/// SurrealDB implementation of the Secret repository.
///
/// Entry values are stored base64-encoded; the key names are kept as-is.
#[derive(Clone)]
pub struct SurrealSecretRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSecretRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SecretRepository for SurrealSecretRepository<C> {
    async fn create(&self, input: NewSecret) -> CertsyncResult<Secret> {
        let id = Uuid::new_v4();
        let metadata = encode_meta(SECRET_KIND, BTreeMap::new(), Vec::new())?;
        let encoded: BTreeMap<&str, String> = input
            .data
            .iter()
            .map(|(key, value)| (key.as_str(), encode_bytes(value)))
            .collect();
        let data = encode(SECRET_KIND, &encoded)?;

        let result = self
            .db
            .query(
                "CREATE type::record('secret', $id) SET \
                 namespace = $namespace, name = $name, \
                 metadata = $metadata, data = $data",
            )
            .bind(("id", id.to_string()))
            .bind(("namespace", input.namespace.clone()))
            .bind(("name", input.name.clone()))
            .bind(("metadata", metadata))
            .bind(("data", data))
            .await
            .map_err(StoreError::from)?;

        let mut result = result
            .check()
            .map_err(|e| StoreError::from_check(SECRET_KIND, &input.namespace, &input.name, e))?;

        let rows: Vec<SecretRow> = result.take(0).map_err(StoreError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(SECRET_KIND, &input.namespace, &input.name))?;

        Ok(row.into_secret(id)?)
    }

    async fn get(&self, namespace: &str, name: &str) -> CertsyncResult<Secret> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM secret \
                 WHERE namespace = $namespace AND name = $name",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<SecretRowWithId> = result.take(0).map_err(StoreError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(SECRET_KIND, namespace, name))?;

        Ok(row.try_into_secret()?)
    }

    async fn delete(&self, namespace: &str, name: &str) -> CertsyncResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE secret \
                 WHERE namespace = $namespace AND name = $name \
                 RETURN BEFORE",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<SecretRow> = result.take(0).map_err(StoreError::from)?;
        if rows.is_empty() {
            return Err(StoreError::not_found(SECRET_KIND, namespace, name).into());
        }
        Ok(())
    }
}
