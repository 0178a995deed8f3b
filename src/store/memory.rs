//! In-memory record store for tests and local runs.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::store::traits::RecordStore;
use crate::verification::SubscriberRecord;

/// A fixed set of records, returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<SubscriberRecord>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<SubscriberRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_telephone_numbers(
        &self,
        telephone_numbers: &[String],
    ) -> Result<Vec<SubscriberRecord>, DatabaseError> {
        let wanted: HashSet<&str> = telephone_numbers.iter().map(String::as_str).collect();
        Ok(self
            .records
            .iter()
            .filter(|record| wanted.contains(record.telephone_number.as_str()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: &str, pin: &str) -> SubscriberRecord {
        SubscriberRecord {
            telephone_number: number.into(),
            account_number: "A1".into(),
            pin: pin.into(),
            zip_code: "90210".into(),
            status: 1,
            subscriber_name: String::new(),
        }
    }

    #[tokio::test]
    async fn returns_only_requested_numbers() {
        let store = MemoryRecordStore::new(vec![
            record("5551234567", "1"),
            record("5559876543", "2"),
        ]);
        let found = store
            .find_by_telephone_numbers(&["5559876543".into(), "5550000000".into()])
            .await
            .unwrap();
        assert_eq!(found, vec![record("5559876543", "2")]);
    }

    #[tokio::test]
    async fn duplicates_come_back_in_insertion_order() {
        let store = MemoryRecordStore::new(vec![
            record("5551234567", "first"),
            record("5551234567", "second"),
        ]);
        let found = store
            .find_by_telephone_numbers(&["5551234567".into()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].pin, "first");
    }

    #[tokio::test]
    async fn empty_store() {
        let store = MemoryRecordStore::default();
        assert!(
            store
                .find_by_telephone_numbers(&["5551234567".into()])
                .await
                .unwrap()
                .is_empty()
        );
    }
}
