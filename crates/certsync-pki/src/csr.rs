//! PKCS#10 certificate signing requests.
//!
//! [`encode_csr`] turns a certificate spec and a private key into a PEM
//! encoded CSR. [`ParsedCsr::parse`] goes the other way, extracting the
//! fields the request matcher compares, into owned values.

use std::net::IpAddr;

use certsync_core::models::certificate::{CertificateSpec, KeyAlgorithm};
use rcgen::{CertificateParams, DistinguishedName, DnType, Ia5String, SanType};
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::FromDer;

use crate::error::PkiError;
use crate::key::{KeyMaterial, public_key_size};

const PEM_PREFIX: &[u8] = b"-----BEGIN";
const CSR_PEM_TAGS: [&str; 2] = ["CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST"];

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";

/// Encode a CSR for `spec`, signed with `key`.
pub fn encode_csr(spec: &CertificateSpec, key: &KeyMaterial) -> Result<String, PkiError> {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    if let Some(cn) = &spec.common_name {
        dn.push(DnType::CommonName, cn.clone());
    }
    // rcgen keeps one value per attribute type.
    match spec.organizations() {
        [] => {}
        [org] => dn.push(DnType::OrganizationName, org.clone()),
        orgs => {
            return Err(PkiError::InvalidSpec(format!(
                "at most one organization is supported, got {}",
                orgs.len()
            )));
        }
    }
    params.distinguished_name = dn;
    params.subject_alt_names = subject_alt_names(spec)?;

    let csr = params
        .serialize_request(key.key_pair())
        .map_err(|e| PkiError::Encoding(format!("CSR serialization failed: {e}")))?;
    csr.pem()
        .map_err(|e| PkiError::Encoding(format!("CSR PEM encoding failed: {e}")))
}

fn subject_alt_names(spec: &CertificateSpec) -> Result<Vec<SanType>, PkiError> {
    let ia5 = |value: &String, field: &str| {
        Ia5String::try_from(value.clone())
            .map_err(|e| PkiError::InvalidSpec(format!("invalid {field} {value:?}: {e}")))
    };

    let mut sans = Vec::new();
    for name in &spec.dns_names {
        sans.push(SanType::DnsName(ia5(name, "DNS name")?));
    }
    for ip in &spec.ip_addresses {
        let addr: IpAddr = ip
            .parse()
            .map_err(|e| PkiError::InvalidSpec(format!("invalid IP address {ip:?}: {e}")))?;
        sans.push(SanType::IpAddress(addr));
    }
    for uri in &spec.uris {
        sans.push(SanType::URI(ia5(uri, "URI")?));
    }
    for email in &spec.email_addresses {
        sans.push(SanType::Rfc822Name(ia5(email, "email address")?));
    }
    Ok(sans)
}

/// The parts of a decoded CSR that requests are matched on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCsr {
    pub common_name: Option<String>,
    pub organizations: Vec<String>,
    pub dns_names: Vec<String>,
    /// Canonical textual form (`IpAddr` display).
    pub ip_addresses: Vec<String>,
    pub uris: Vec<String>,
    pub email_addresses: Vec<String>,
    pub key_algorithm: Option<KeyAlgorithm>,
    /// Key size in bits, when it can be derived from the public key.
    pub key_size: Option<u32>,
    /// Raw subjectPublicKey bit string contents.
    pub public_key_bits: Vec<u8>,
}

impl ParsedCsr {
    /// Decode a PEM or DER CSR and verify its self-signature.
    pub fn parse(bytes: &[u8]) -> Result<Self, PkiError> {
        let der = to_der(bytes)?;
        let (_, csr) = X509CertificationRequest::from_der(&der)
            .map_err(|e| PkiError::Decoding(format!("invalid PKCS#10 structure: {e}")))?;
        csr.verify_signature()
            .map_err(|e| PkiError::Signature(e.to_string()))?;

        let info = &csr.certification_request_info;

        let common_name = info
            .subject
            .iter_common_name()
            .next()
            .map(|attr| attr.as_str().map(str::to_string))
            .transpose()
            .map_err(|e| PkiError::Decoding(format!("common name: {e}")))?;
        let organizations = info
            .subject
            .iter_organization()
            .map(|attr| attr.as_str().map(str::to_string))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PkiError::Decoding(format!("organization: {e}")))?;

        let mut parsed = ParsedCsr {
            common_name,
            organizations,
            public_key_bits: info.subject_pki.subject_public_key.data.to_vec(),
            ..Default::default()
        };

        parsed.key_algorithm = match info.subject_pki.algorithm.algorithm.to_id_string().as_str() {
            OID_RSA_ENCRYPTION => Some(KeyAlgorithm::Rsa),
            OID_EC_PUBLIC_KEY => Some(KeyAlgorithm::Ecdsa),
            OID_ED25519 => Some(KeyAlgorithm::Ed25519),
            _ => None,
        };
        parsed.key_size = public_key_size(parsed.key_algorithm, &info.subject_pki);

        if let Some(extensions) = csr.requested_extensions() {
            for ext in extensions {
                if let ParsedExtension::SubjectAlternativeName(san) = ext {
                    for name in &san.general_names {
                        parsed.push_general_name(name)?;
                    }
                }
            }
        }

        Ok(parsed)
    }

    fn push_general_name(&mut self, name: &GeneralName<'_>) -> Result<(), PkiError> {
        match name {
            GeneralName::DNSName(dns) => self.dns_names.push(dns.to_string()),
            GeneralName::URI(uri) => self.uris.push(uri.to_string()),
            GeneralName::RFC822Name(email) => self.email_addresses.push(email.to_string()),
            GeneralName::IPAddress(raw) => {
                let addr = match raw.len() {
                    4 => {
                        let octets: [u8; 4] = (*raw).try_into().map_err(|_| bad_ip(raw))?;
                        IpAddr::from(octets)
                    }
                    16 => {
                        let octets: [u8; 16] = (*raw).try_into().map_err(|_| bad_ip(raw))?;
                        IpAddr::from(octets)
                    }
                    _ => return Err(bad_ip(raw)),
                };
                self.ip_addresses.push(addr.to_string());
            }
            _ => {}
        }
        Ok(())
    }
}

fn bad_ip(raw: &[u8]) -> PkiError {
    PkiError::Decoding(format!("IP address SAN has invalid length {}", raw.len()))
}

fn to_der(bytes: &[u8]) -> Result<Vec<u8>, PkiError> {
    let trimmed = bytes.trim_ascii_start();
    if !trimmed.starts_with(PEM_PREFIX) {
        return Ok(bytes.to_vec());
    }
    let block = pem::parse(trimmed).map_err(|e| PkiError::Decoding(format!("invalid PEM: {e}")))?;
    if !CSR_PEM_TAGS.contains(&block.tag()) {
        return Err(PkiError::Decoding(format!(
            "unexpected PEM block {:?}",
            block.tag()
        )));
    }
    Ok(block.into_contents())
}

#[cfg(test)]
mod tests {
    use certsync_core::models::certificate::X509Subject;
    use rcgen::KeyPair;

    use super::*;

    fn key() -> KeyMaterial {
        KeyMaterial::from_key_pair(KeyPair::generate().unwrap()).unwrap()
    }

    fn spec() -> CertificateSpec {
        CertificateSpec {
            common_name: Some("example.com".into()),
            dns_names: vec!["example.com".into(), "www.example.com".into()],
            ip_addresses: vec!["10.0.0.1".into(), "::1".into()],
            uris: vec!["spiffe://cluster.local/ns/testns/sa/app".into()],
            email_addresses: vec!["ops@example.com".into()],
            subject: Some(X509Subject {
                organizations: vec!["Example Org".into()],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn encoded_csr_decodes_to_spec_fields() {
        let key = key();
        let pem = encode_csr(&spec(), &key).unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));

        let parsed = ParsedCsr::parse(pem.as_bytes()).unwrap();
        assert_eq!(parsed.common_name.as_deref(), Some("example.com"));
        assert_eq!(parsed.organizations, ["Example Org"]);
        assert_eq!(parsed.dns_names, ["example.com", "www.example.com"]);
        assert_eq!(parsed.ip_addresses, ["10.0.0.1", "::1"]);
        assert_eq!(parsed.uris, ["spiffe://cluster.local/ns/testns/sa/app"]);
        assert_eq!(parsed.email_addresses, ["ops@example.com"]);
        assert_eq!(parsed.key_algorithm, Some(KeyAlgorithm::Ecdsa));
        assert_eq!(parsed.key_size, key.key_size());
        assert_eq!(parsed.public_key_bits, key.public_key_bits());
    }

    #[test]
    fn der_input_is_accepted() {
        let pem = encode_csr(&spec(), &key()).unwrap();
        let der = pem::parse(pem.as_bytes()).unwrap().into_contents();
        let parsed = ParsedCsr::parse(&der).unwrap();
        assert_eq!(parsed.common_name.as_deref(), Some("example.com"));
    }

    #[test]
    fn empty_spec_has_no_subject_or_sans() {
        let pem = encode_csr(&CertificateSpec::default(), &key()).unwrap();
        let parsed = ParsedCsr::parse(pem.as_bytes()).unwrap();
        assert_eq!(parsed.common_name, None);
        assert!(parsed.organizations.is_empty());
        assert!(parsed.dns_names.is_empty());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            ParsedCsr::parse(b"invalid"),
            Err(PkiError::Decoding(_))
        ));
        assert!(matches!(ParsedCsr::parse(b""), Err(PkiError::Decoding(_))));
    }

    #[test]
    fn wrong_pem_block_is_rejected() {
        let pem = KeyPair::generate().unwrap().serialize_pem();
        assert!(matches!(
            ParsedCsr::parse(pem.as_bytes()),
            Err(PkiError::Decoding(_))
        ));
    }

    #[test]
    fn invalid_ip_is_a_spec_error() {
        let spec = CertificateSpec {
            ip_addresses: vec!["not-an-ip".into()],
            ..Default::default()
        };
        assert!(matches!(
            encode_csr(&spec, &key()),
            Err(PkiError::InvalidSpec(_))
        ));
    }

    #[test]
    fn multiple_organizations_are_rejected() {
        let spec = CertificateSpec {
            subject: Some(X509Subject {
                organizations: vec!["A".into(), "B".into()],
            }),
            ..Default::default()
        };
        assert!(matches!(
            encode_csr(&spec, &key()),
            Err(PkiError::InvalidSpec(_))
        ));
    }
}
