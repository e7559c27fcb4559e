//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. Object identity is a UUID
//! record id; `(namespace, name)` is unique per table. Kind-specific
//! payloads (spec, status, metadata) are stored as FLEXIBLE objects and
//! decoded through serde.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::StoreError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Certificates
-- =======================================================================
DEFINE TABLE certificate SCHEMAFULL;
DEFINE FIELD namespace ON TABLE certificate TYPE string;
DEFINE FIELD name ON TABLE certificate TYPE string;
DEFINE FIELD metadata ON TABLE certificate TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD spec ON TABLE certificate TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD status ON TABLE certificate TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD next_private_key_secret_name ON TABLE certificate \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE certificate TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_certificate_ns_name ON TABLE certificate \
    COLUMNS namespace, name UNIQUE;
DEFINE INDEX idx_certificate_next_key ON TABLE certificate \
    COLUMNS namespace, next_private_key_secret_name;

-- =======================================================================
-- Certificate requests (owned by a certificate)
-- =======================================================================
DEFINE TABLE certificate_request SCHEMAFULL;
DEFINE FIELD namespace ON TABLE certificate_request TYPE string;
DEFINE FIELD name ON TABLE certificate_request TYPE string;
DEFINE FIELD metadata ON TABLE certificate_request TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD owner_uid ON TABLE certificate_request TYPE option<string>;
DEFINE FIELD spec ON TABLE certificate_request TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE certificate_request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_certificate_request_ns_name ON TABLE certificate_request \
    COLUMNS namespace, name UNIQUE;
DEFINE INDEX idx_certificate_request_owner ON TABLE certificate_request \
    COLUMNS namespace, owner_uid;

-- =======================================================================
-- Secrets (private key material)
-- =======================================================================
DEFINE TABLE secret SCHEMAFULL;
DEFINE FIELD namespace ON TABLE secret TYPE string;
DEFINE FIELD name ON TABLE secret TYPE string;
DEFINE FIELD metadata ON TABLE secret TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD data ON TABLE secret TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE secret TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_secret_ns_name ON TABLE secret \
    COLUMNS namespace, name UNIQUE;

-- =======================================================================
-- Events (notifications attached to objects)
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD involved_kind ON TABLE event TYPE string;
DEFINE FIELD involved_namespace ON TABLE event TYPE string;
DEFINE FIELD involved_name ON TABLE event TYPE string;
DEFINE FIELD involved_uid ON TABLE event TYPE string;
DEFINE FIELD event_type ON TABLE event TYPE string \
    ASSERT $value IN ['Normal', 'Warning'];
DEFINE FIELD reason ON TABLE event TYPE string;
DEFINE FIELD message ON TABLE event TYPE string;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_involved ON TABLE event COLUMNS involved_uid;
";

/// Run all pending migrations against the given database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), StoreError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                StoreError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                StoreError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}
