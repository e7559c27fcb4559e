//! The request manager.
//!
//! Each pass takes one Certificate key, reloads everything it needs from
//! the store, deletes owned requests that no longer fit the Certificate,
//! and creates a fresh request when none is valid. No state survives
//! between passes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod name;
pub mod reconciler;
pub mod revision;
pub mod synthesizer;

pub use config::RequestManagerConfig;
pub use error::ReconcileError;
pub use matcher::{Classification, MatchTarget, classify};
pub use name::{NameGenerator, RandomNameGenerator, StaticNameGenerator};
pub use reconciler::{DeletedRequest, ReconcileOutcome, RequestManager, SkipReason};
pub use revision::target_revision;
