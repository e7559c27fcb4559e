//! certsync Controller — drives CertificateRequest objects toward the
//! state their owning Certificate declares.
//!
//! The only controller today is the request manager
//! ([`requestmanager::RequestManager`]). It is generic over the
//! `certsync-core` repository traits and has no dependency on a concrete
//! store.

pub mod requestmanager;

pub use requestmanager::{
    Classification, NameGenerator, RandomNameGenerator, ReconcileError, ReconcileOutcome,
    RequestManager, RequestManagerConfig, SkipReason, StaticNameGenerator,
};
