//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tracing::info;

use crate::error::StoreError;
use crate::schema::run_migrations;

/// Open an embedded in-memory database with the schema applied.
///
/// Selects `namespace` and `database`, then applies pending migrations.
pub async fn connect_memory(namespace: &str, database: &str) -> Result<Surreal<Db>, StoreError> {
    info!(namespace, database, "Opening in-memory SurrealDB");

    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(namespace).use_db(database).await?;
    run_migrations(&db).await?;
    Ok(db)
}
