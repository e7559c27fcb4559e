//! certsync Core — Domain models, repository traits, and error types.
//!
//! This crate defines the shared types used across all certsync crates:
//! the Certificate / CertificateRequest / Secret / Event resources, the
//! async repository traits that make up the object-store boundary, and
//! the crate-wide [`error::CertsyncError`].

pub mod encoding;
pub mod error;
pub mod models;
pub mod repository;
