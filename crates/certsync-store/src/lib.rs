//! certsync Store — SurrealDB connection management and repository
//! implementations for the certsync resources.
//!
//! This crate provides:
//! - Embedded database setup ([`connect_memory`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for every `certsync-core` trait
//!   ([`repository`]), bundled per connection in [`Store`]
//! - Error types ([`StoreError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::connect_memory;
pub use error::StoreError;
pub use schema::run_migrations;

use surrealdb::{Connection, Surreal};

use crate::repository::{
    SurrealCertificateRepository, SurrealCertificateRequestRepository, SurrealEventRecorder,
    SurrealSecretRepository,
};

/// All repositories sharing one SurrealDB handle.
#[derive(Clone)]
pub struct Store<C: Connection> {
    pub certificates: SurrealCertificateRepository<C>,
    pub requests: SurrealCertificateRequestRepository<C>,
    pub secrets: SurrealSecretRepository<C>,
    pub events: SurrealEventRecorder<C>,
}

impl<C: Connection> Store<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            certificates: SurrealCertificateRepository::new(db.clone()),
            requests: SurrealCertificateRequestRepository::new(db.clone()),
            secrets: SurrealSecretRepository::new(db.clone()),
            events: SurrealEventRecorder::new(db),
        }
    }
}
