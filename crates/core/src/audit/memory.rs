use std::sync::RwLock;

use super::{AuditError, AuditFilter, AuditRecord, AuditStore};

/// In-memory audit store backed by a plain Vec.
///
/// Suitable for embedded use and tests. Hosts that need durable audit
/// history implement [`AuditStore`] over their own database.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, ignoring any filter.
    pub fn len(&self) -> usize {
        self.records.read().expect("audit store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let mut records = self.records.write().expect("audit store lock poisoned");
        let id = records.len() as i64 + 1;
        let mut stored = record.clone();
        stored.id = id;
        records.push(stored);
        Ok(id)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let records = self.records.read().expect("audit store lock poisoned");
        let matching = records
            .iter()
            .filter(|record| filter.matches(record))
            .skip(filter.offset.max(0) as usize);

        let results = if filter.limit > 0 {
            matching.take(filter.limit as usize).cloned().collect()
        } else {
            matching.cloned().collect()
        };
        Ok(results)
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        let records = self.records.read().expect("audit store lock poisoned");
        Ok(records
            .iter()
            .filter(|record| filter.matches(record))
            .count() as i64)
    }
}
