//! CertificateRequest domain model.
//!
//! A CertificateRequest is one attempt to obtain a signed certificate for
//! a single revision of its owning Certificate. Requests are never
//! patched: a stale request is deleted and a fresh one created.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::certificate::IssuerRef;
use super::meta::{ObjectMeta, OwnerReference};
use crate::encoding::base64_bytes;

pub const CERTIFICATE_REQUEST_KIND: &str = "CertificateRequest";

/// Annotation naming the secret whose private key signed the CSR.
pub const PRIVATE_KEY_SECRET_NAME_ANNOTATION: &str = "private-key-secret-name";

/// Annotation holding the Certificate revision this request is for,
/// encoded as a canonical decimal integer.
pub const REVISION_ANNOTATION: &str = "revision";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CertificateRequestSpec {
    /// PEM (or DER) encoded PKCS#10 certificate signing request.
    #[serde(with = "base64_bytes")]
    pub csr: Vec<u8>,
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub is_ca: bool,
    #[serde(default)]
    pub issuer_ref: IssuerRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateRequest {
    pub meta: ObjectMeta,
    pub spec: CertificateRequestSpec,
}

impl CertificateRequest {
    pub fn revision_annotation(&self) -> Option<&str> {
        self.meta.annotation(REVISION_ANNOTATION)
    }

    pub fn private_key_secret_name(&self) -> Option<&str> {
        self.meta.annotation(PRIVATE_KEY_SECRET_NAME_ANNOTATION)
    }
}

/// Fields required to create a new certificate request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCertificateRequest {
    pub namespace: String,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerReference>,
    pub spec: CertificateRequestSpec,
}

impl NewCertificateRequest {
    /// The controller owner, which the store indexes for owner lookups.
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.controller)
    }
}
