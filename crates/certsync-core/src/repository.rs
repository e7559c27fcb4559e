//! Repository trait definitions for object-store access.
//!
//! All repository operations are async and fallible. Objects are
//! addressed by `(namespace, name)`; `get` and `delete` report a missing
//! object as [`CertsyncError::NotFound`](crate::error::CertsyncError).

use uuid::Uuid;

use crate::error::CertsyncResult;
use crate::models::{
    certificate::{Certificate, CertificateStatus, NewCertificate},
    certificate_request::{CertificateRequest, NewCertificateRequest},
    event::{Event, NewEvent, ObjectReference},
    secret::{NewSecret, Secret},
};

pub trait CertificateRepository: Send + Sync {
    fn create(
        &self,
        input: NewCertificate,
    ) -> impl Future<Output = CertsyncResult<Certificate>> + Send;
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<Certificate>> + Send;
    /// Replace the status block. Owned by collaborators, never by the
    /// request manager.
    fn update_status(
        &self,
        namespace: &str,
        name: &str,
        status: CertificateStatus,
    ) -> impl Future<Output = CertsyncResult<Certificate>> + Send;
    fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<()>> + Send;
    /// Certificates in `namespace` whose next private key lives in
    /// `secret_name`.
    fn list_by_next_private_key(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> impl Future<Output = CertsyncResult<Vec<Certificate>>> + Send;
}

pub trait CertificateRequestRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the name is taken.
    fn create(
        &self,
        input: NewCertificateRequest,
    ) -> impl Future<Output = CertsyncResult<CertificateRequest>> + Send;
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<CertificateRequest>> + Send;
    fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<()>> + Send;
    /// Requests in `namespace` whose controller owner has `owner_uid`.
    fn list_owned_by(
        &self,
        namespace: &str,
        owner_uid: Uuid,
    ) -> impl Future<Output = CertsyncResult<Vec<CertificateRequest>>> + Send;
}

pub trait SecretRepository: Send + Sync {
    fn create(&self, input: NewSecret) -> impl Future<Output = CertsyncResult<Secret>> + Send;
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<Secret>> + Send;
    fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = CertsyncResult<()>> + Send;
}

/// Sink for human-readable notifications attached to objects.
pub trait EventRecorder: Send + Sync {
    fn record(&self, input: NewEvent) -> impl Future<Output = CertsyncResult<Event>> + Send;
    /// Events for one object, oldest first.
    fn list_for(
        &self,
        involved_object: &ObjectReference,
    ) -> impl Future<Output = CertsyncResult<Vec<Event>>> + Send;
}
