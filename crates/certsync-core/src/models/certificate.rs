//! Certificate domain model.
//!
//! A Certificate is the long-lived declaration of a desired X.509
//! certificate. Its status is written by collaborators (the key rotation
//! controller, the issuance backends); the request manager only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

pub const CERTIFICATE_KIND: &str = "Certificate";

/// Private key algorithm requested for a certificate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ecdsa,
    Ed25519,
}

/// Constraints on the private key used to sign the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PrivateKeySpec {
    pub algorithm: Option<KeyAlgorithm>,
    /// Key size in bits (RSA modulus length or EC curve size).
    pub size: Option<u32>,
}

/// Distinguished name fields beyond the common name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct X509Subject {
    #[serde(default)]
    pub organizations: Vec<String>,
}

/// Reference to the issuer that should sign requests for a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IssuerRef {
    pub name: String,
    pub kind: Option<String>,
    pub group: Option<String>,
}

/// Desired state of a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CertificateSpec {
    pub common_name: Option<String>,
    #[serde(default)]
    pub dns_names: Vec<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    #[serde(default)]
    pub uris: Vec<String>,
    #[serde(default)]
    pub email_addresses: Vec<String>,
    pub subject: Option<X509Subject>,
    pub private_key: Option<PrivateKeySpec>,
    /// Requested validity in seconds. `None` leaves it to the issuer.
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub is_ca: bool,
    #[serde(default)]
    pub issuer_ref: IssuerRef,
    /// Secret the signed certificate is eventually written to.
    #[serde(default)]
    pub secret_name: String,
}

impl CertificateSpec {
    pub fn organizations(&self) -> &[String] {
        self.subject
            .as_ref()
            .map(|s| s.organizations.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CertificateConditionType {
    Ready,
    /// An issuance cycle is currently desired or in progress.
    Issuing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateCondition {
    pub condition_type: CertificateConditionType,
    pub status: ConditionStatus,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl CertificateCondition {
    pub fn new(condition_type: CertificateConditionType, status: ConditionStatus) -> Self {
        Self {
            condition_type,
            status,
            reason: None,
            message: None,
            last_transition_time: Some(Utc::now()),
        }
    }
}

/// Observed state of a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CertificateStatus {
    /// Number of completed issuances. `None` and `Some(0)` both mean
    /// "never issued".
    pub revision: Option<u64>,
    /// Secret holding the private key for the next issuance.
    pub next_private_key_secret_name: Option<String>,
    #[serde(default)]
    pub conditions: Vec<CertificateCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Certificate {
    pub meta: ObjectMeta,
    pub spec: CertificateSpec,
    #[serde(default)]
    pub status: CertificateStatus,
}

impl Certificate {
    pub fn condition(
        &self,
        condition_type: CertificateConditionType,
    ) -> Option<&CertificateCondition> {
        self.status
            .conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// `true` only when the `Issuing` condition is present and `True`.
    pub fn is_issuing(&self) -> bool {
        self.condition(CertificateConditionType::Issuing)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }
}

/// Fields required to create a new certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertificate {
    pub namespace: String,
    pub name: String,
    pub annotations: Option<std::collections::BTreeMap<String, String>>,
    pub spec: CertificateSpec,
}
