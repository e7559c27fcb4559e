//! Mapping watch events onto the Certificate keys to reconcile.

use certsync_core::error::CertsyncResult;
use certsync_core::models::certificate::{CERTIFICATE_KIND, Certificate};
use certsync_core::models::certificate_request::CertificateRequest;
use certsync_core::models::meta::ObjectKey;
use certsync_core::models::secret::Secret;
use certsync_core::repository::CertificateRepository;

/// A Certificate change enqueues the Certificate itself.
pub fn certificate_key(certificate: &Certificate) -> String {
    certificate.meta.key().to_string()
}

/// A request change enqueues its controlling Certificate, if any.
pub fn request_owner_key(request: &CertificateRequest) -> Option<String> {
    request
        .meta
        .controller_ref()
        .filter(|owner| owner.kind == CERTIFICATE_KIND)
        .map(|owner| ObjectKey::new(&request.meta.namespace, &owner.name).to_string())
}

/// A Secret change enqueues every Certificate that is waiting on it as
/// its next private key.
pub async fn secret_certificate_keys<C: CertificateRepository>(
    certificates: &C,
    secret: &Secret,
) -> CertsyncResult<Vec<String>> {
    let dependents = certificates
        .list_by_next_private_key(&secret.meta.namespace, &secret.meta.name)
        .await?;
    Ok(dependents.iter().map(certificate_key).collect())
}
