//! Building and submitting a fresh CertificateRequest.

use std::collections::BTreeMap;

use certsync_core::models::certificate::{CERTIFICATE_KIND, Certificate};
use certsync_core::models::certificate_request::{
    CertificateRequest, CertificateRequestSpec, NewCertificateRequest,
    PRIVATE_KEY_SECRET_NAME_ANNOTATION, REVISION_ANNOTATION,
};
use certsync_core::models::event::{EventType, NewEvent, ObjectReference};
use certsync_core::models::meta::OwnerReference;
use certsync_core::repository::{CertificateRequestRepository, EventRecorder};
use certsync_pki::{KeyMaterial, encode_csr, key_mismatches};
use tracing::{info, warn};

use super::config::RequestManagerConfig;
use super::error::ReconcileError;
use super::name::{NameGenerator, request_name};
use super::revision::format_revision;

/// Event reason recorded against the Certificate after a create.
pub const REASON_REQUESTED: &str = "Requested";

/// Build the request for `revision`, signed with `key`.
///
/// Fails with [`ReconcileError::SynthesisFailed`] if `key` does not
/// satisfy the certificate's `privateKey` settings.
pub fn build_request<N: NameGenerator>(
    certificate: &Certificate,
    secret_name: &str,
    revision: u64,
    key: &KeyMaterial,
    names: &N,
    config: &RequestManagerConfig,
) -> Result<NewCertificateRequest, ReconcileError> {
    if let Some(field) = key_mismatches(key, &certificate.spec) {
        return Err(ReconcileError::SynthesisFailed(format!(
            "private key does not satisfy {field}"
        )));
    }
    let csr = encode_csr(&certificate.spec, key)?;

    let annotations = BTreeMap::from([
        (
            PRIVATE_KEY_SECRET_NAME_ANNOTATION.to_string(),
            secret_name.to_string(),
        ),
        (REVISION_ANNOTATION.to_string(), format_revision(revision)),
    ]);

    let name = request_name(
        &certificate.meta.name,
        config.max_base_name_length,
        &names.suffix(config.name_suffix_length),
    );

    Ok(NewCertificateRequest {
        namespace: certificate.meta.namespace.clone(),
        name,
        annotations,
        owner_references: vec![OwnerReference {
            kind: CERTIFICATE_KIND.into(),
            name: certificate.meta.name.clone(),
            uid: certificate.meta.uid,
            controller: true,
        }],
        spec: CertificateRequestSpec {
            csr: csr.into_bytes(),
            duration_secs: certificate.spec.duration_secs,
            is_ca: certificate.spec.is_ca,
            issuer_ref: certificate.spec.issuer_ref.clone(),
        },
    })
}

/// Create `request` and announce it on the Certificate.
///
/// A failed event write is logged and otherwise ignored.
pub async fn submit_request<R, E>(
    requests: &R,
    events: &E,
    certificate: &Certificate,
    request: NewCertificateRequest,
) -> Result<CertificateRequest, ReconcileError>
where
    R: CertificateRequestRepository,
    E: EventRecorder,
{
    let created = requests.create(request).await?;

    info!(
        namespace = %created.meta.namespace,
        name = %created.meta.name,
        revision = created.revision_annotation().unwrap_or_default(),
        "Created certificate request"
    );

    let event = NewEvent {
        involved_object: ObjectReference::from_meta(CERTIFICATE_KIND, &certificate.meta),
        event_type: EventType::Normal,
        reason: REASON_REQUESTED.into(),
        message: format!(
            "Created new CertificateRequest resource {:?}",
            created.meta.name
        ),
    };
    if let Err(e) = events.record(event).await {
        warn!(
            certificate = %certificate.meta.key(),
            error = %e,
            "Failed to record event"
        );
    }

    Ok(created)
}
