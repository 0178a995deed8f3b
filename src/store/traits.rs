//! `RecordStore` trait: read-only access to subscriber records.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::verification::SubscriberRecord;

/// Default name of the subscriber table.
pub const DEFAULT_TABLE_NAME: &str = "bandwidth-port-out-validation";

/// Backend-agnostic subscriber record lookup.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the records for every listed number in one round trip.
    ///
    /// Numbers with no record are simply absent from the result. If the
    /// backend holds duplicates they are returned in backend order.
    async fn find_by_telephone_numbers(
        &self,
        telephone_numbers: &[String],
    ) -> Result<Vec<SubscriberRecord>, DatabaseError>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers
/// (letters, digits, `_` and `-`) are allowed.
pub fn validate_table_name(name: &str) -> Result<(), DatabaseError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidTableName(name.to_string()))
    }
}
