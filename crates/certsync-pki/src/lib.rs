//! certsync PKI — Private key material and certificate signing requests.
//!
//! Provides:
//! - Private key validation from stored secrets ([`KeyMaterial`])
//! - PKCS#10 CSR encoding from a certificate spec ([`encode_csr`])
//! - CSR decoding and comparison against a spec ([`ParsedCsr`],
//!   [`spec_mismatches`], [`key_mismatches`])

pub mod compare;
pub mod csr;
pub mod error;
pub mod key;

pub use compare::{key_mismatches, spec_mismatches};
pub use csr::{ParsedCsr, encode_csr};
pub use error::PkiError;
pub use key::{KeyMaterial, KeyUnavailable};
