//! Error types for the certsync system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertsyncError {
    #[error("Object not found: {kind} {key}")]
    NotFound { kind: String, key: String },

    #[error("Object already exists: {kind} {key}")]
    AlreadyExists { kind: String, key: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CertsyncError {
    /// Shorthand for a [`CertsyncError::NotFound`] on a namespaced object.
    pub fn not_found(kind: &str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: format!("{namespace}/{name}"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type CertsyncResult<T> = Result<T, CertsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_namespaced_key() {
        let err = CertsyncError::not_found("Certificate", "testns", "test");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Object not found: Certificate testns/test");
    }

    #[test]
    fn other_variants_are_not_not_found() {
        assert!(!CertsyncError::Store("boom".into()).is_not_found());
    }
}
