//! Version-tracked schema migrations for the libSQL backend.
//!
//! The subscriber table name is configurable, so each migration renders its
//! SQL for a given table. Tables that already exist are left alone: the
//! service only ever reads them.

use libsql::Connection;

use crate::error::DatabaseError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: fn(&str) -> String,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "subscriber_records",
    sql: subscriber_records_v1,
}];

fn subscriber_records_v1(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            TelephoneNumber TEXT PRIMARY KEY,
            AccountNumber TEXT NOT NULL DEFAULT '',
            Pin TEXT NOT NULL DEFAULT '',
            ZipCode TEXT NOT NULL DEFAULT '',
            Status INTEGER NOT NULL DEFAULT 0,
            SubscriberName TEXT NOT NULL DEFAULT ''
        );
        "#
    )
}

/// Run all pending migrations for `table` against the given connection.
pub async fn run_migrations(conn: &Connection, table: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to create _migrations table: {e}")))?;

    let current_version = get_current_version(conn).await?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                table,
                "Applying migration"
            );
            conn.execute_batch(&(migration.sql)(table))
                .await
                .map_err(|e| {
                    DatabaseError::Migration(format!(
                        "Migration V{} ({}) failed: {e}",
                        migration.version, migration.name
                    ))
                })?;
            seed_version(conn, migration.version, migration.name).await?;
        }
    }

    let version = get_current_version(conn).await?;
    tracing::debug!(version, "Database migrations complete");
    Ok(())
}

/// Get the highest applied migration version, or 0 if none.
async fn get_current_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to query migration version: {e}")))?;

    let row = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read migration version: {e}")))?;

    match row {
        Some(row) => {
            let version: i64 = row.get(0).map_err(|e| {
                DatabaseError::Migration(format!("Failed to parse migration version: {e}"))
            })?;
            Ok(version)
        }
        None => Ok(0),
    }
}

/// Insert a version record into `_migrations`.
async fn seed_version(conn: &Connection, version: i64, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
        libsql::params![version, name],
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to record migration V{version}: {e}")))?;
    Ok(())
}
