//! libSQL backend: async `RecordStore` implementation.
//!
//! Supports local file and in-memory databases. The subscriber table is
//! created on open if it is missing; rows are never written by the service.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::params::Params;
use libsql::{Connection, Database as LibSqlDatabase, Value};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{RecordStore, validate_table_name};
use crate::verification::SubscriberRecord;

/// Column order shared by every SELECT and by `row_to_record`.
const RECORD_COLUMNS: &str =
    "TelephoneNumber, AccountNumber, Pin, ZipCode, Status, SubscriberName";

/// Most telephone numbers one lookup can bind; SQLite's bound-parameter limit.
pub const MAX_LOOKUP_BATCH: usize = 32766;

/// libSQL subscriber record store.
///
/// Stores a single connection that is reused for all lookups.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlRecordStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    table: String,
}

impl LibSqlRecordStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path, table: &str) -> Result<Self, DatabaseError> {
        validate_table_name(table)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::connect(db, table).await?;
        info!(path = %path.display(), table, "Record store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory(table: &str) -> Result<Self, DatabaseError> {
        validate_table_name(table)?;

        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::connect(db, table).await
    }

    async fn connect(db: LibSqlDatabase, table: &str) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn, table).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
            table: table.to_string(),
        })
    }

    /// Name of the subscriber table this store reads.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// `?1, ?2, ... ?n`
fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a libsql Row to a SubscriberRecord.
///
/// NULL text columns read as empty strings and a NULL status as 0, so a
/// half-filled row fails the comparisons instead of the lookup. A value of the
/// wrong type is an error.
fn row_to_record(row: &libsql::Row) -> Result<SubscriberRecord, libsql::Error> {
    Ok(SubscriberRecord {
        telephone_number: row.get(0)?,
        account_number: text_or_empty(row, 1)?,
        pin: text_or_empty(row, 2)?,
        zip_code: text_or_empty(row, 3)?,
        status: status_or_zero(row, 4)?,
        subscriber_name: text_or_empty(row, 5)?,
    })
}

fn text_or_empty(row: &libsql::Row, idx: i32) -> Result<String, libsql::Error> {
    match row.get_value(idx)? {
        Value::Null => Ok(String::new()),
        _ => row.get(idx),
    }
}

fn status_or_zero(row: &libsql::Row, idx: i32) -> Result<i64, libsql::Error> {
    match row.get_value(idx)? {
        Value::Null => Ok(0),
        _ => row.get(idx),
    }
}

#[async_trait]
impl RecordStore for LibSqlRecordStore {
    async fn find_by_telephone_numbers(
        &self,
        telephone_numbers: &[String],
    ) -> Result<Vec<SubscriberRecord>, DatabaseError> {
        if telephone_numbers.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"SELECT {RECORD_COLUMNS} FROM "{}" WHERE TelephoneNumber IN ({})"#,
            self.table,
            placeholders(telephone_numbers.len())
        );
        let values: Vec<Value> = telephone_numbers
            .iter()
            .map(|number| Value::Text(number.clone()))
            .collect();

        let mut rows = self
            .conn
            .query(&sql, Params::Positional(values))
            .await
            .map_err(|e| DatabaseError::Query(format!("find_by_telephone_numbers: {e}")))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("find_by_telephone_numbers: {e}")))?
        {
            let record = row_to_record(&row).map_err(|e| {
                DatabaseError::Query(format!("find_by_telephone_numbers row parse: {e}"))
            })?;
            records.push(record);
        }

        debug!(
            requested = telephone_numbers.len(),
            found = records.len(),
            "Subscriber records fetched"
        );
        Ok(records)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.conn
            .query("SELECT 1", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("ping: {e}")))?;
        Ok(())
    }
}
