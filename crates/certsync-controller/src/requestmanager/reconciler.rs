//! The reconcile loop body.

use certsync_core::error::CertsyncError;
use certsync_core::models::certificate::Certificate;
use certsync_core::models::meta::ObjectKey;
use certsync_core::repository::{
    CertificateRepository, CertificateRequestRepository, EventRecorder, SecretRepository,
};
use certsync_pki::{KeyMaterial, key_mismatches};
use tracing::{debug, info};

use super::config::RequestManagerConfig;
use super::error::ReconcileError;
use super::matcher::{Classification, MatchTarget, classify};
use super::name::{NameGenerator, RandomNameGenerator};
use super::revision::target_revision;
use super::synthesizer::{build_request, submit_request};

/// Why a pass ended without looking at requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MalformedKey,
    CertificateNotFound,
    NotIssuing,
    NoNextPrivateKey,
    KeyUnavailable,
}

/// A request removed during cleanup, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedRequest {
    pub name: String,
    pub classification: Classification,
}

/// Result of one successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Skipped(SkipReason),
    /// A valid request already exists; nothing was changed.
    Converged,
    Mutated {
        deleted: Vec<DeletedRequest>,
        created: Option<String>,
    },
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        !matches!(self, ReconcileOutcome::Mutated { .. })
    }
}

/// Keeps exactly one valid CertificateRequest in flight for every
/// Certificate that is issuing.
///
/// Generic over repository implementations so that the controller has no
/// dependency on the store crate.
pub struct RequestManager<C, R, S, E, N = RandomNameGenerator>
where
    C: CertificateRepository,
    R: CertificateRequestRepository,
    S: SecretRepository,
    E: EventRecorder,
    N: NameGenerator,
{
    certificates: C,
    requests: R,
    secrets: S,
    events: E,
    names: N,
    config: RequestManagerConfig,
}

impl<C, R, S, E, N> RequestManager<C, R, S, E, N>
where
    C: CertificateRepository,
    R: CertificateRequestRepository,
    S: SecretRepository,
    E: EventRecorder,
    N: NameGenerator,
{
    pub fn new(
        certificates: C,
        requests: R,
        secrets: S,
        events: E,
        names: N,
        config: RequestManagerConfig,
    ) -> Self {
        Self {
            certificates,
            requests,
            secrets,
            events,
            names,
            config,
        }
    }

    pub fn config(&self) -> &RequestManagerConfig {
        &self.config
    }

    /// Run one pass for the Certificate identified by `key`
    /// (`namespace/name`, or a bare name in the default namespace).
    pub async fn process_item(&self, key: &str) -> Result<ReconcileOutcome, ReconcileError> {
        // 1. Decode the key.
        let key = match ObjectKey::parse(key, &self.config.default_namespace) {
            Ok(k) => k,
            Err(e) => {
                debug!(key, error = %e, "Dropping malformed key");
                return Ok(ReconcileOutcome::Skipped(SkipReason::MalformedKey));
            }
        };

        // 2. Load the certificate.
        let certificate = match self.certificates.get(&key.namespace, &key.name).await {
            Ok(c) => c,
            Err(CertsyncError::NotFound { .. }) => {
                debug!(%key, "Certificate not found");
                return Ok(ReconcileOutcome::Skipped(SkipReason::CertificateNotFound));
            }
            Err(e) => return Err(e.into()),
        };

        // 3. Only issuing certificates are ours.
        if !certificate.is_issuing() {
            debug!(%key, "Certificate is not issuing");
            return Ok(ReconcileOutcome::Skipped(SkipReason::NotIssuing));
        }

        // 4. Wait for the next private key.
        let Some(secret_name) = certificate.status.next_private_key_secret_name.as_deref() else {
            debug!(%key, "Certificate has no next private key yet");
            return Ok(ReconcileOutcome::Skipped(SkipReason::NoNextPrivateKey));
        };
        let Some(key_material) = self.load_key(&certificate, secret_name).await? else {
            return Ok(ReconcileOutcome::Skipped(SkipReason::KeyUnavailable));
        };

        // 5. Target revision.
        let revision = target_revision(certificate.status.revision);
        let target = MatchTarget {
            revision,
            secret_name,
            spec: &certificate.spec,
            public_key_bits: key_material.public_key_bits(),
        };

        // 6. Classify owned requests.
        let owned = self
            .requests
            .list_owned_by(&certificate.meta.namespace, certificate.meta.uid)
            .await?;

        let mut has_valid = false;
        let mut deleted = Vec::new();

        for request in &owned {
            let classification = classify(request, &target);
            debug!(
                %key,
                request = %request.meta.name,
                %classification,
                "Classified certificate request"
            );
            if classification.is_valid() {
                has_valid = true;
                continue;
            }
            if !classification.is_invalid() {
                continue;
            }

            // 7. Delete everything invalid for this revision.
            match self
                .requests
                .delete(&request.meta.namespace, &request.meta.name)
                .await
            {
                Ok(()) => {
                    info!(
                        %key,
                        request = %request.meta.name,
                        %classification,
                        "Deleted invalid certificate request"
                    );
                    deleted.push(DeletedRequest {
                        name: request.meta.name.clone(),
                        classification,
                    });
                }
                Err(CertsyncError::NotFound { .. }) => {
                    debug!(%key, request = %request.meta.name, "Certificate request already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }

        // 8. Converged, or create the one request for this revision.
        if has_valid {
            return Ok(if deleted.is_empty() {
                ReconcileOutcome::Converged
            } else {
                ReconcileOutcome::Mutated {
                    deleted,
                    created: None,
                }
            });
        }

        let new_request = build_request(
            &certificate,
            secret_name,
            revision,
            &key_material,
            &self.names,
            &self.config,
        )?;
        let created =
            submit_request(&self.requests, &self.events, &certificate, new_request).await?;

        Ok(ReconcileOutcome::Mutated {
            deleted,
            created: Some(created.meta.name),
        })
    }

    /// The validated next private key, or `None` while it is missing,
    /// unusable, or of a different type or size than the spec pins.
    async fn load_key(
        &self,
        certificate: &Certificate,
        secret_name: &str,
    ) -> Result<Option<KeyMaterial>, ReconcileError> {
        let secret = match self
            .secrets
            .get(&certificate.meta.namespace, secret_name)
            .await
        {
            Ok(s) => s,
            Err(CertsyncError::NotFound { .. }) => {
                debug!(
                    certificate = %certificate.meta.key(),
                    secret = secret_name,
                    "Next private key secret not found"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let key = match KeyMaterial::from_secret(&secret) {
            Ok(k) => k,
            Err(reason) => {
                debug!(
                    certificate = %certificate.meta.key(),
                    secret = secret_name,
                    %reason,
                    "Next private key is unusable"
                );
                return Ok(None);
            }
        };

        // Any CSR signed by this key would be deleted on the next pass.
        if let Some(field) = key_mismatches(&key, &certificate.spec) {
            debug!(
                certificate = %certificate.meta.key(),
                secret = secret_name,
                field,
                "Next private key does not satisfy the certificate spec"
            );
            return Ok(None);
        }

        Ok(Some(key))
    }
}
