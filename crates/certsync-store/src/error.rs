//! Store-specific error types and conversions.

use certsync_core::error::CertsyncError;

/// Store-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored {kind} could not be decoded: {message}")]
    Decode { kind: String, message: String },

    #[error("Object not found: {kind} {key}")]
    NotFound { kind: String, key: String },

    #[error("Object already exists: {kind} {key}")]
    AlreadyExists { kind: String, key: String },
}

impl StoreError {
    pub(crate) fn not_found(kind: &str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: format!("{namespace}/{name}"),
        }
    }

    pub(crate) fn decode(kind: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            kind: kind.into(),
            message: err.to_string(),
        }
    }

    /// Classify a failed statement. Unique index violations become
    /// [`StoreError::AlreadyExists`].
    pub(crate) fn from_check(
        kind: &str,
        namespace: &str,
        name: &str,
        err: surrealdb::Error,
    ) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            Self::AlreadyExists {
                kind: kind.into(),
                key: format!("{namespace}/{name}"),
            }
        } else {
            Self::Query(message)
        }
    }
}

impl From<StoreError> for CertsyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, key } => CertsyncError::NotFound { kind, key },
            StoreError::AlreadyExists { kind, key } => CertsyncError::AlreadyExists { kind, key },
            other => CertsyncError::Store(other.to_string()),
        }
    }
}
