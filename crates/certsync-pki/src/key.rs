//! Private key material loaded from a secret.
//!
//! A secret is usable only if its `tls.key` entry holds a PEM-encoded
//! private key of a supported type (RSA, ECDSA P-256/P-384, Ed25519).
//! PKCS#8 is read as is; PKCS#1 (`RSA PRIVATE KEY`) and SEC1
//! (`EC PRIVATE KEY`) blocks are rewrapped into PKCS#8 first. Every other
//! shape collapses into [`KeyUnavailable`]: the caller treats a broken
//! key exactly like a missing one.

use std::collections::BTreeMap;
use std::fmt;

use certsync_core::models::certificate::KeyAlgorithm;
use certsync_core::models::secret::{Secret, TLS_PRIVATE_KEY_KEY};
use pkcs8::der::asn1::AnyRef;
use pkcs8::der::{Decode, Encode};
use pkcs8::{AlgorithmIdentifierRef, ObjectIdentifier, PrivateKeyInfo};
use rcgen::KeyPair;
use sec1::EcPrivateKey;
use thiserror::Error;
use x509_parser::prelude::FromDer;
use x509_parser::public_key::PublicKey;
use x509_parser::x509::SubjectPublicKeyInfo;

const PKCS8_TAG: &str = "PRIVATE KEY";
const PKCS1_TAG: &str = "RSA PRIVATE KEY";
const SEC1_TAG: &str = "EC PRIVATE KEY";

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// Why a secret could not provide a private key. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyUnavailable {
    #[error("secret has no {TLS_PRIVATE_KEY_KEY:?} entry")]
    MissingEntry,
    #[error("secret entry {TLS_PRIVATE_KEY_KEY:?} is empty")]
    Empty,
    #[error("private key could not be decoded: {0}")]
    Undecodable(String),
}

/// A decoded private key and the public key bits derived from it.
pub struct KeyMaterial {
    key_pair: KeyPair,
    algorithm: KeyAlgorithm,
    key_size: Option<u32>,
    public_key_bits: Vec<u8>,
}

impl KeyMaterial {
    pub fn from_secret(secret: &Secret) -> Result<Self, KeyUnavailable> {
        Self::from_secret_data(&secret.data)
    }

    pub fn from_secret_data(data: &BTreeMap<String, Vec<u8>>) -> Result<Self, KeyUnavailable> {
        let raw = data
            .get(TLS_PRIVATE_KEY_KEY)
            .ok_or(KeyUnavailable::MissingEntry)?;
        if raw.is_empty() {
            return Err(KeyUnavailable::Empty);
        }
        let pem = std::str::from_utf8(raw)
            .map_err(|e| KeyUnavailable::Undecodable(format!("key is not UTF-8: {e}")))?;
        Self::from_pem(pem)
    }

    /// Decode the first private key block in `pem`. Other blocks, such
    /// as the `EC PARAMETERS` header OpenSSL writes, are skipped.
    pub fn from_pem(pem: &str) -> Result<Self, KeyUnavailable> {
        let blocks =
            pem::parse_many(pem).map_err(|e| KeyUnavailable::Undecodable(e.to_string()))?;
        let block = blocks
            .iter()
            .find(|b| [PKCS8_TAG, PKCS1_TAG, SEC1_TAG].contains(&b.tag()))
            .ok_or_else(|| KeyUnavailable::Undecodable("no private key PEM block".into()))?;

        let pkcs8 = match block.tag() {
            PKCS1_TAG => wrap_pkcs1(block.contents())?,
            SEC1_TAG => wrap_sec1(block.contents())?,
            _ => block.contents().to_vec(),
        };
        let pkcs8_pem = pem::encode(&pem::Pem::new(PKCS8_TAG, pkcs8));

        let key_pair = KeyPair::from_pem(&pkcs8_pem)
            .map_err(|e| KeyUnavailable::Undecodable(e.to_string()))?;
        Self::from_key_pair(key_pair)
    }

    pub fn from_key_pair(key_pair: KeyPair) -> Result<Self, KeyUnavailable> {
        let algorithm = algorithm_of(&key_pair).ok_or_else(|| {
            KeyUnavailable::Undecodable(format!(
                "unsupported key algorithm {:?}",
                key_pair.algorithm()
            ))
        })?;

        let spki = key_pair.public_key_der();
        let (_, info) = SubjectPublicKeyInfo::from_der(&spki)
            .map_err(|e| KeyUnavailable::Undecodable(format!("public key: {e}")))?;
        let key_size = public_key_size(Some(algorithm), &info);
        let public_key_bits = info.subject_public_key.data.to_vec();

        Ok(Self {
            key_pair,
            algorithm,
            key_size,
            public_key_bits,
        })
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Key size in bits: the modulus for RSA, the curve for ECDSA.
    pub fn key_size(&self) -> Option<u32> {
        self.key_size
    }

    /// Raw subjectPublicKey bit string contents, as embedded in a CSR.
    pub fn public_key_bits(&self) -> &[u8] {
        &self.public_key_bits
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}

/// Size in bits of the public key in `info`. Ed25519 counts as 256.
pub(crate) fn public_key_size(
    algorithm: Option<KeyAlgorithm>,
    info: &SubjectPublicKeyInfo<'_>,
) -> Option<u32> {
    match algorithm? {
        KeyAlgorithm::Ed25519 => Some(256),
        // Uncompressed or compressed curve point.
        KeyAlgorithm::Ecdsa => match info.subject_public_key.data.len() {
            65 | 33 => Some(256),
            97 | 49 => Some(384),
            133 | 67 => Some(521),
            _ => None,
        },
        KeyAlgorithm::Rsa => match info.parsed() {
            Ok(PublicKey::RSA(rsa)) => u32::try_from(rsa.key_size()).ok(),
            _ => None,
        },
    }
}

fn wrap_pkcs1(der: &[u8]) -> Result<Vec<u8>, KeyUnavailable> {
    let algorithm = AlgorithmIdentifierRef {
        oid: RSA_ENCRYPTION,
        parameters: Some(AnyRef::NULL),
    };
    PrivateKeyInfo::new(algorithm, der)
        .to_der()
        .map_err(|e| KeyUnavailable::Undecodable(format!("PKCS#1 key: {e}")))
}

/// The curve moves from the SEC1 structure into the PKCS#8 algorithm
/// identifier; the inner copy is dropped.
fn wrap_sec1(der: &[u8]) -> Result<Vec<u8>, KeyUnavailable> {
    let undecodable = |e: pkcs8::der::Error| KeyUnavailable::Undecodable(format!("SEC1 key: {e}"));

    let ec_key = EcPrivateKey::from_der(der).map_err(undecodable)?;
    let curve = ec_key
        .parameters
        .and_then(|p| p.named_curve())
        .ok_or_else(|| KeyUnavailable::Undecodable("SEC1 key names no curve".into()))?;
    let inner = EcPrivateKey {
        parameters: None,
        ..ec_key
    }
    .to_der()
    .map_err(undecodable)?;

    let algorithm = AlgorithmIdentifierRef {
        oid: EC_PUBLIC_KEY,
        parameters: Some(AnyRef::from(&curve)),
    };
    PrivateKeyInfo::new(algorithm, &inner)
        .to_der()
        .map_err(undecodable)
}

fn algorithm_of(key_pair: &KeyPair) -> Option<KeyAlgorithm> {
    let alg = key_pair.algorithm();
    if alg == &rcgen::PKCS_ECDSA_P256_SHA256 || alg == &rcgen::PKCS_ECDSA_P384_SHA384 {
        Some(KeyAlgorithm::Ecdsa)
    } else if alg == &rcgen::PKCS_ED25519 {
        Some(KeyAlgorithm::Ed25519)
    } else if alg == &rcgen::PKCS_RSA_SHA256
        || alg == &rcgen::PKCS_RSA_SHA384
        || alg == &rcgen::PKCS_RSA_SHA512
    {
        Some(KeyAlgorithm::Rsa)
    } else {
        None
    }
}
