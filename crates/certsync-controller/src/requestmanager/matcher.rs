//! Classification of existing requests against the current target.

use std::fmt;

use certsync_core::models::certificate::CertificateSpec;
use certsync_core::models::certificate_request::CertificateRequest;
use certsync_pki::{ParsedCsr, spec_mismatches};

use super::revision::parse_revision;

/// What a pass is trying to converge on.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub revision: u64,
    /// Secret holding the key the request must have been signed with.
    pub secret_name: &'a str,
    pub spec: &'a CertificateSpec,
    /// subjectPublicKey bits of the current private key.
    pub public_key_bits: &'a [u8],
}

/// Verdict for one existing request. Every variant other than
/// [`Classification::Valid`] and [`Classification::WrongRevision`] means
/// the request must be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Belongs to another revision. Left alone.
    WrongRevision,
    /// Revision annotation missing or not a canonical decimal.
    MalformedRevision,
    /// Signed for a different private key secret.
    WrongKey,
    /// CSR does not decode, or its signature does not verify.
    MalformedCsr(String),
    /// CSR public key differs from the current private key.
    KeyMismatch,
    /// CSR or request spec no longer matches the certificate spec.
    SpecMismatch { fields: Vec<&'static str> },
    Valid,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid)
    }

    /// `true` for the variants the reconciler deletes.
    pub fn is_invalid(&self) -> bool {
        !matches!(self, Classification::Valid | Classification::WrongRevision)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::WrongRevision => f.write_str("WrongRevision"),
            Classification::MalformedRevision => f.write_str("MalformedRevision"),
            Classification::WrongKey => f.write_str("WrongKey"),
            Classification::MalformedCsr(reason) => write!(f, "MalformedCsr({reason})"),
            Classification::KeyMismatch => f.write_str("KeyMismatch"),
            Classification::SpecMismatch { fields } => {
                write!(f, "SpecMismatch({})", fields.join(", "))
            }
            Classification::Valid => f.write_str("Valid"),
        }
    }
}

/// Classify `request` against `target`. Never fails: any malformed input
/// maps onto a variant.
pub fn classify(request: &CertificateRequest, target: &MatchTarget<'_>) -> Classification {
    let Some(revision) = request.revision_annotation().and_then(parse_revision) else {
        return Classification::MalformedRevision;
    };
    if revision != target.revision {
        return Classification::WrongRevision;
    }

    if request.private_key_secret_name() != Some(target.secret_name) {
        return Classification::WrongKey;
    }

    let csr = match ParsedCsr::parse(&request.spec.csr) {
        Ok(csr) => csr,
        Err(e) => return Classification::MalformedCsr(e.to_string()),
    };

    if csr.public_key_bits != target.public_key_bits {
        return Classification::KeyMismatch;
    }

    let mut fields = spec_mismatches(&csr, target.spec);
    if request.spec.duration_secs != target.spec.duration_secs {
        fields.push("duration");
    }
    if request.spec.is_ca != target.spec.is_ca {
        fields.push("isCA");
    }
    if request.spec.issuer_ref != target.spec.issuer_ref {
        fields.push("issuerRef");
    }
    if !fields.is_empty() {
        return Classification::SpecMismatch { fields };
    }

    Classification::Valid
}
