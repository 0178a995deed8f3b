//! Persistence layer: read-only subscriber record lookup.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::{LibSqlRecordStore, MAX_LOOKUP_BATCH};
pub use memory::MemoryRecordStore;
pub use traits::{DEFAULT_TABLE_NAME, RecordStore, validate_table_name};
