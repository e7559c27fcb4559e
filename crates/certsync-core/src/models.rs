//! Domain models for certsync.
//!
//! These are the resources shared across all crates. Every stored
//! object carries an [`meta::ObjectMeta`]; the kind-specific payload
//! lives next to it.

pub mod certificate;
pub mod certificate_request;
pub mod event;
pub mod meta;
pub mod secret;
