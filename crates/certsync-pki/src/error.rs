//! PKI error types.

use certsync_core::error::CertsyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PkiError {
    #[error("invalid certificate spec: {0}")]
    InvalidSpec(String),

    #[error("CSR encoding failed: {0}")]
    Encoding(String),

    #[error("CSR decoding failed: {0}")]
    Decoding(String),

    #[error("CSR signature does not verify: {0}")]
    Signature(String),
}

impl From<PkiError> for CertsyncError {
    fn from(err: PkiError) -> Self {
        CertsyncError::Crypto(err.to_string())
    }
}
