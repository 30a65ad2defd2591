use indexmap::IndexMap;
use std::sync::RwLock;

use crate::data::{JobId, Record};
use crate::errors::SimError;

/// Persistence backend for generated records.
///
/// Implementations keep records grouped by job, in append order.
pub trait RecordStore: Send + Sync {
    /// Persist one batch for `job_id`.
    fn append(&self, job_id: JobId, batch: &[Record]) -> Result<(), SimError>;
    /// Every record stored for `job_id`, in append order. Unknown jobs have none.
    fn records_for(&self, job_id: JobId) -> Result<Vec<Record>, SimError>;
    /// Number of records stored for `job_id`.
    fn count_for(&self, job_id: JobId) -> Result<usize, SimError> {
        Ok(self.records_for(job_id)?.len())
    }
    /// Drop every record of `job_id`; returns how many were removed.
    fn delete_job(&self, job_id: JobId) -> Result<usize, SimError>;
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<IndexMap<JobId, Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs with at least one stored record, in first-append order.
    pub fn job_ids(&self) -> Result<Vec<JobId>, SimError> {
        Ok(self
            .records
            .read()
            .map_err(|_| poisoned(0))?
            .keys()
            .copied()
            .collect())
    }
}

fn poisoned(job_id: JobId) -> SimError {
    SimError::Store {
        job_id,
        reason: "record store lock poisoned".into(),
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, job_id: JobId, batch: &[Record]) -> Result<(), SimError> {
        self.records
            .write()
            .map_err(|_| poisoned(job_id))?
            .entry(job_id)
            .or_default()
            .extend_from_slice(batch);
        Ok(())
    }

    fn records_for(&self, job_id: JobId) -> Result<Vec<Record>, SimError> {
        Ok(self
            .records
            .read()
            .map_err(|_| poisoned(job_id))?
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    fn count_for(&self, job_id: JobId) -> Result<usize, SimError> {
        Ok(self
            .records
            .read()
            .map_err(|_| poisoned(job_id))?
            .get(&job_id)
            .map_or(0, Vec::len))
    }

    fn delete_job(&self, job_id: JobId) -> Result<usize, SimError> {
        Ok(self
            .records
            .write()
            .map_err(|_| poisoned(job_id))?
            .shift_remove(&job_id)
            .map_or(0, |records| records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::generate;
    use crate::data::JobSpec;

    fn records(job_id: JobId, volume: u64) -> Vec<Record> {
        generate(&JobSpec::with_seed("store", volume, job_id))
            .unwrap()
            .with_job_id(job_id)
            .iter()
            .collect()
    }

    #[test]
    fn append_keeps_batches_in_order_per_job() {
        let store = InMemoryRecordStore::new();
        let first = records(1, 30);
        store.append(1, &first[..10]).unwrap();
        store.append(2, &records(2, 5)).unwrap();
        store.append(1, &first[10..]).unwrap();

        assert_eq!(store.records_for(1).unwrap(), first);
        assert_eq!(store.count_for(2).unwrap(), 5);
        assert_eq!(store.job_ids().unwrap(), vec![1, 2]);
        assert!(store.records_for(9).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_only_the_named_job() {
        let store = InMemoryRecordStore::new();
        store.append(1, &records(1, 4)).unwrap();
        store.append(2, &records(2, 6)).unwrap();
        assert_eq!(store.delete_job(1).unwrap(), 4);
        assert_eq!(store.delete_job(1).unwrap(), 0);
        assert_eq!(store.count_for(1).unwrap(), 0);
        assert_eq!(store.count_for(2).unwrap(), 6);
    }
}
