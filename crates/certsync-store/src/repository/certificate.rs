//! SurrealDB implementation of [`CertificateRepository`].

use certsync_core::error::CertsyncResult;
use certsync_core::models::certificate::{
    CERTIFICATE_KIND, Certificate, CertificateStatus, NewCertificate,
};
use certsync_core::repository::CertificateRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{MetaColumns, decode, encode, encode_meta, parse_uid};
use crate::error::StoreError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CertificateRow {
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    spec: serde_json::Value,
    status: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl CertificateRow {
    fn into_certificate(self, uid: Uuid) -> Result<Certificate, StoreError> {
        let meta = MetaColumns {
            uid,
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            created_at: self.created_at,
        }
        .into_meta(CERTIFICATE_KIND)?;
        Ok(Certificate {
            meta,
            spec: decode(CERTIFICATE_KIND, self.spec)?,
            status: decode(CERTIFICATE_KIND, self.status)?,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CertificateRowWithId {
    record_id: String,
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    spec: serde_json::Value,
    status: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl CertificateRowWithId {
    fn try_into_certificate(self) -> Result<Certificate, StoreError> {
        let uid = parse_uid(CERTIFICATE_KIND, &self.record_id)?;
        CertificateRow {
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            spec: self.spec,
            status: self.status,
            created_at: self.created_at,
        }
        .into_certificate(uid)
    }
}

/// SurrealDB implementation of the Certificate repository.
#[derive(Clone)]
pub struct SurrealCertificateRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCertificateRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find(&self, namespace: &str, name: &str) -> Result<Certificate, StoreError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM certificate \
                 WHERE namespace = $namespace AND name = $name",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await?;

        let rows: Vec<CertificateRowWithId> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(CERTIFICATE_KIND, namespace, name))?;
        row.try_into_certificate()
    }
}

impl<C: Connection> CertificateRepository for SurrealCertificateRepository<C> {
    async fn create(&self, input: NewCertificate) -> CertsyncResult<Certificate> {
        let id = Uuid::new_v4();
        let metadata = encode_meta(
            CERTIFICATE_KIND,
            input.annotations.unwrap_or_default(),
            Vec::new(),
        )?;
        let spec = encode(CERTIFICATE_KIND, &input.spec)?;
        let status = encode(CERTIFICATE_KIND, &CertificateStatus::default())?;

        let result = self
            .db
            .query(
                "CREATE type::record('certificate', $id) SET \
                 namespace = $namespace, name = $name, \
                 metadata = $metadata, spec = $spec, status = $status",
            )
            .bind(("id", id.to_string()))
            .bind(("namespace", input.namespace.clone()))
            .bind(("name", input.name.clone()))
            .bind(("metadata", metadata))
            .bind(("spec", spec))
            .bind(("status", status))
            .await
            .map_err(StoreError::from)?;

        let mut result = result.check().map_err(|e| {
            StoreError::from_check(CERTIFICATE_KIND, &input.namespace, &input.name, e)
        })?;

        let rows: Vec<CertificateRow> = result.take(0).map_err(StoreError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            StoreError::not_found(CERTIFICATE_KIND, &input.namespace, &input.name)
        })?;

        Ok(row.into_certificate(id)?)
    }

    async fn get(&self, namespace: &str, name: &str) -> CertsyncResult<Certificate> {
        Ok(self.find(namespace, name).await?)
    }

    async fn update_status(
        &self,
        namespace: &str,
        name: &str,
        status: CertificateStatus,
    ) -> CertsyncResult<Certificate> {
        let existing = self.find(namespace, name).await?;
        let next_key = status.next_private_key_secret_name.clone();
        let status = encode(CERTIFICATE_KIND, &status)?;

        let result = self
            .db
            .query(
                "UPDATE type::record('certificate', $id) SET \
                 status = $status, \
                 next_private_key_secret_name = $next_key",
            )
            .bind(("id", existing.meta.uid.to_string()))
            .bind(("status", status))
            .bind(("next_key", next_key))
            .await
            .map_err(StoreError::from)?;

        let mut result = result
            .check()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows: Vec<CertificateRow> = result.take(0).map_err(StoreError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(CERTIFICATE_KIND, namespace, name))?;

        Ok(row.into_certificate(existing.meta.uid)?)
    }

    async fn delete(&self, namespace: &str, name: &str) -> CertsyncResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE certificate \
                 WHERE namespace = $namespace AND name = $name \
                 RETURN BEFORE",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<CertificateRow> = result.take(0).map_err(StoreError::from)?;
        if rows.is_empty() {
            return Err(StoreError::not_found(CERTIFICATE_KIND, namespace, name).into());
        }
        Ok(())
    }

    async fn list_by_next_private_key(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> CertsyncResult<Vec<Certificate>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM certificate \
                 WHERE namespace = $namespace \
                 AND next_private_key_secret_name = $secret_name \
                 ORDER BY created_at ASC",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("secret_name", secret_name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<CertificateRowWithId> = result.take(0).map_err(StoreError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_certificate())
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(items)
    }
}
