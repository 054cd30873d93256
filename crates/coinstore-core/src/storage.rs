use std::{path::PathBuf, slice, vec};

use thiserror::Error;

use crate::models::{FieldValue, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{table}: missing required field '{field}'")]
    MissingField { table: &'static str, field: &'static str },
    #[error("{table}: no index declared for field '{field}'")]
    UnknownIndex { table: &'static str, field: String },
    #[error("invalid value for '{field}': {value:?} ({reason})")]
    InvalidValue { field: String, value: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("corrupt journal {} at line {line}: {reason}", .path.display())]
    CorruptJournal { path: PathBuf, line: usize, reason: String },
    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("{0}")]
    Other(String),
}

/// Snapshot of records returned by a query, in insertion order.
///
/// Iterating does not touch the store, so a set can be walked any number of
/// times while writers proceed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<R> {
    records: Vec<R>,
}

impl<R> RecordSet<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn iter(&self) -> slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&R> {
        self.records.first()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<R> Default for RecordSet<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R> FromIterator<R> for RecordSet<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R> IntoIterator for RecordSet<R> {
    type Item = R;
    type IntoIter = vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a RecordSet<R> {
    type Item = &'a R;
    type IntoIter = slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub trait RecordStore<R: Record>: Send + Sync {
    /// Inserts or overwrites `record`, returning it with its identifier set.
    fn save(&self, record: R) -> Result<R, StoreError>;
    fn find_all(&self) -> Result<RecordSet<R>, StoreError>;
    /// Equality lookup on an indexed field or on the identifier field.
    fn find_by_field(&self, field: &str, value: &FieldValue) -> Result<RecordSet<R>, StoreError>;
    fn find_by_id(&self, id: &RecordId) -> Result<Option<R>, StoreError>;
    /// Returns whether a record was removed.
    fn delete_by_id(&self, id: &RecordId) -> Result<bool, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;

    /// Deletes by identifier. Absent records, and records that never
    /// received an identifier, are ignored.
    fn delete(&self, record: &R) -> Result<(), StoreError> {
        match record.id() {
            Some(id) => self.delete_by_id(&id).map(|_| ()),
            None => Ok(()),
        }
    }
}
