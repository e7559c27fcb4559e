//! SurrealDB implementation of [`CertificateRequestRepository`].

use certsync_core::error::CertsyncResult;
use certsync_core::models::certificate_request::{
    CERTIFICATE_REQUEST_KIND, CertificateRequest, NewCertificateRequest,
};
use certsync_core::repository::CertificateRequestRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{MetaColumns, decode, encode, encode_meta, parse_uid};
use crate::error::StoreError;

#[derive(Debug, SurrealValue)]
struct RequestRow {
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    spec: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_request(self, uid: Uuid) -> Result<CertificateRequest, StoreError> {
        let meta = MetaColumns {
            uid,
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            created_at: self.created_at,
        }
        .into_meta(CERTIFICATE_REQUEST_KIND)?;
        Ok(CertificateRequest {
            meta,
            spec: decode(CERTIFICATE_REQUEST_KIND, self.spec)?,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct RequestRowWithId {
    record_id: String,
    namespace: String,
    name: String,
    metadata: serde_json::Value,
    spec: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl RequestRowWithId {
    fn try_into_request(self) -> Result<CertificateRequest, StoreError> {
        let uid = parse_uid(CERTIFICATE_REQUEST_KIND, &self.record_id)?;
        RequestRow {
            namespace: self.namespace,
            name: self.name,
            metadata: self.metadata,
            spec: self.spec,
            created_at: self.created_at,
        }
        .into_request(uid)
    }
}

/// SurrealDB implementation of the CertificateRequest repository.
///
/// The controller owner's uid is copied into the `owner_uid` column so
/// that owner lookups are an indexed query.
#[derive(Clone)]
pub struct SurrealCertificateRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCertificateRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CertificateRequestRepository for SurrealCertificateRequestRepository<C> {
    async fn create(&self, input: NewCertificateRequest) -> CertsyncResult<CertificateRequest> {
        let id = Uuid::new_v4();
        let owner_uid = input.controller_ref().map(|r| r.uid.to_string());
        let spec = encode(CERTIFICATE_REQUEST_KIND, &input.spec)?;
        let NewCertificateRequest {
            namespace,
            name,
            annotations,
            owner_references,
            ..
        } = input;
        let metadata = encode_meta(CERTIFICATE_REQUEST_KIND, annotations, owner_references)?;

        let result = self
            .db
            .query(
                "CREATE type::record('certificate_request', $id) SET \
                 namespace = $namespace, name = $name, \
                 metadata = $metadata, owner_uid = $owner_uid, \
                 spec = $spec",
            )
            .bind(("id", id.to_string()))
            .bind(("namespace", namespace.clone()))
            .bind(("name", name.clone()))
            .bind(("metadata", metadata))
            .bind(("owner_uid", owner_uid))
            .bind(("spec", spec))
            .await
            .map_err(StoreError::from)?;

        let mut result = result.check().map_err(|e| {
            StoreError::from_check(CERTIFICATE_REQUEST_KIND, &namespace, &name, e)
        })?;

        let rows: Vec<RequestRow> = result.take(0).map_err(StoreError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            StoreError::not_found(CERTIFICATE_REQUEST_KIND, &namespace, &name)
        })?;

        Ok(row.into_request(id)?)
    }

    async fn get(&self, namespace: &str, name: &str) -> CertsyncResult<CertificateRequest> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM certificate_request \
                 WHERE namespace = $namespace AND name = $name",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<RequestRowWithId> = result.take(0).map_err(StoreError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            StoreError::not_found(CERTIFICATE_REQUEST_KIND, namespace, name)
        })?;

        Ok(row.try_into_request()?)
    }

    async fn delete(&self, namespace: &str, name: &str) -> CertsyncResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE certificate_request \
                 WHERE namespace = $namespace AND name = $name \
                 RETURN BEFORE",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<RequestRow> = result.take(0).map_err(StoreError::from)?;
        if rows.is_empty() {
            return Err(StoreError::not_found(CERTIFICATE_REQUEST_KIND, namespace, name).into());
        }
        Ok(())
    }

    async fn list_owned_by(
        &self,
        namespace: &str,
        owner_uid: Uuid,
    ) -> CertsyncResult<Vec<CertificateRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM certificate_request \
                 WHERE namespace = $namespace AND owner_uid = $owner_uid \
                 ORDER BY created_at ASC, name ASC",
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("owner_uid", owner_uid.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<RequestRowWithId> = result.take(0).map_err(StoreError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(items)
    }
}
