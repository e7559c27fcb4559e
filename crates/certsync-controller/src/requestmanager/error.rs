//! Reconcile error types.

use certsync_core::error::CertsyncError;
use certsync_pki::PkiError;
use thiserror::Error;

/// A pass that ended in error. The caller should requeue the key.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store operation failed: {0}")]
    StoreOperationFailed(#[from] CertsyncError),

    #[error("failed to synthesize certificate request: {0}")]
    SynthesisFailed(String),
}

impl ReconcileError {
    /// Every reconcile error is transient from the controller's point of
    /// view; the next pass re-derives everything from the store.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::StoreOperationFailed(_) | ReconcileError::SynthesisFailed(_) => true,
        }
    }
}

impl From<PkiError> for ReconcileError {
    fn from(err: PkiError) -> Self {
        ReconcileError::SynthesisFailed(err.to_string())
    }
}

impl From<ReconcileError> for CertsyncError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::StoreOperationFailed(inner) => inner,
            ReconcileError::SynthesisFailed(msg) => CertsyncError::Crypto(msg),
        }
    }
}
