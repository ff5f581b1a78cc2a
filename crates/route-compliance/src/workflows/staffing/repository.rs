use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::domain::Record;

/// Storage abstraction over a single record collection.
pub trait RecordRepository<T: Record>: Send + Sync {
    /// All records, ascending by the record's sort key.
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    /// Persist a new record and return the id the store minted for it.
    fn add(&self, record: T) -> Result<T::Id, RepositoryError>;
    fn update(&self, record: T) -> Result<(), RepositoryError>;
    /// Replace the stored record only while `expected` holds for the current
    /// value, checked and written atomically. Returns `false` when it did not.
    fn update_if(
        &self,
        record: T,
        expected: &dyn Fn(&T) -> bool,
    ) -> Result<bool, RepositoryError>;
    fn delete(&self, id: &T::Id) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store used by the API binary, the demo, and tests.
pub struct InMemoryRecordRepository<T: Record> {
    records: Arc<Mutex<HashMap<T::Id, T>>>,
    sequence: Arc<AtomicU64>,
}

impl<T: Record> Default for InMemoryRecordRepository<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl<T: Record> Clone for InMemoryRecordRepository<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<T: Record> InMemoryRecordRepository<T> {
    fn next_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", T::COLLECTION)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<T::Id, T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable(format!("{} store poisoned", T::COLLECTION)))
    }
}

impl<T: Record> RecordRepository<T> for InMemoryRecordRepository<T> {
    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<T> = guard.values().cloned().collect();
        records.sort_by(|left, right| {
            left.sort_key()
                .cmp(right.sort_key())
                .then_with(|| left.id().to_string().cmp(&right.id().to_string()))
        });
        Ok(records)
    }

    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn add(&self, mut record: T) -> Result<T::Id, RepositoryError> {
        record.assign_id(self.next_id());
        let mut guard = self.lock()?;
        let id = record.id().clone();
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(id.clone(), record);
        Ok(id)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(record.id()) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn update_if(
        &self,
        record: T,
        expected: &dyn Fn(&T) -> bool,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        let existing = guard.get_mut(record.id()).ok_or(RepositoryError::NotFound)?;
        if !expected(existing) {
            return Ok(false);
        }
        *existing = record;
        Ok(true)
    }

    fn delete(&self, id: &T::Id) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
