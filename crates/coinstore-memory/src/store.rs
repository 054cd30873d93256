use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::Path,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use coinstore_core::{
    FieldValue, IdPolicy, Record, RecordId, RecordSet, RecordStore, StoreError, ValidationError,
};

use crate::journal::{Journal, JournalEntry};

/// Rows are addressed by slot: the insertion sequence number handed to an
/// identifier the first time it is stored. Slots stay stable across re-saves,
/// which keeps `find_all` and index buckets in first-insertion order.
struct Table<R> {
    rows: BTreeMap<u64, R>,
    slots: HashMap<RecordId, u64>,
    indexes: HashMap<&'static str, HashMap<FieldValue, BTreeSet<u64>>>,
    next_slot: u64,
}

impl<R: Record> Table<R> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            slots: HashMap::new(),
            indexes: R::INDEXES.iter().map(|field| (*field, HashMap::new())).collect(),
            next_slot: 1,
        }
    }

    /// Returns true when `id` was not stored before.
    fn upsert(&mut self, id: RecordId, record: R) -> bool {
        match self.slots.get(&id).copied() {
            Some(slot) => {
                if let Some(previous) = self.rows.remove(&slot) {
                    self.unindex(slot, &previous);
                }
                self.index(slot, &record);
                self.rows.insert(slot, record);
                false
            }
            None => {
                let slot = self.next_slot;
                self.next_slot += 1;
                self.slots.insert(id, slot);
                self.index(slot, &record);
                self.rows.insert(slot, record);
                true
            }
        }
    }

    fn remove(&mut self, id: &RecordId) -> Option<R> {
        let slot = self.slots.remove(id)?;
        let record = self.rows.remove(&slot)?;
        self.unindex(slot, &record);
        Some(record)
    }

    fn get(&self, id: &RecordId) -> Option<&R> {
        self.slots.get(id).and_then(|slot| self.rows.get(slot))
    }

    fn index(&mut self, slot: u64, record: &R) {
        for &field in R::INDEXES {
            if let Some(value) = record.field(field) {
                self.indexes
                    .entry(field)
                    .or_default()
                    .entry(value)
                    .or_default()
                    .insert(slot);
            }
        }
    }

    fn unindex(&mut self, slot: u64, record: &R) {
        for &field in R::INDEXES {
            let Some(value) = record.field(field) else { continue };
            let Some(buckets) = self.indexes.get_mut(field) else { continue };
            if let Some(bucket) = buckets.get_mut(&value) {
                bucket.remove(&slot);
                if bucket.is_empty() {
                    buckets.remove(&value);
                }
            }
        }
    }

    fn lookup(&self, field: &str, value: &FieldValue) -> RecordSet<R> {
        match self.indexes.get(field).and_then(|buckets| buckets.get(value)) {
            Some(bucket) => bucket
                .iter()
                .filter_map(|slot| self.rows.get(slot))
                .cloned()
                .collect(),
            None => RecordSet::default(),
        }
    }
}

struct Inner<R> {
    table: Table<R>,
    journal: Option<Journal>,
}

/// Record store holding one table in memory.
///
/// The primary map, the secondary indexes and the journal handle sit behind a
/// single `RwLock`: writers hold it exclusively for the whole mutation and
/// readers copy results out before releasing it.
pub struct InMemoryStore<R: Record> {
    inner: RwLock<Inner<R>>,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                table: Table::new(),
                journal: None,
            }),
        }
    }

    /// Opens a journaled store backed by `<data_dir>/<table>.log`, replaying
    /// any mutations already recorded there.
    pub fn open(data_dir: impl AsRef<Path>, sync_writes: bool) -> Result<Self, StoreError> {
        let path = data_dir.as_ref().join(format!("{}.log", R::TABLE));
        let (journal, entries) = Journal::open::<R>(&path, sync_writes)?;

        let mut table = Table::new();
        let replayed = entries.len();
        for (line, entry) in entries {
            match entry {
                JournalEntry::Save { record } => {
                    let id = record.id().ok_or_else(|| StoreError::CorruptJournal {
                        path: path.clone(),
                        line,
                        reason: "saved record has no identifier".to_string(),
                    })?;
                    table.upsert(id, record);
                }
                JournalEntry::Delete { id } => {
                    table.remove(&id);
                }
            }
        }

        tracing::info!(
            table = R::TABLE,
            path = %path.display(),
            replayed,
            records = table.rows.len(),
            "Journal replayed"
        );

        Ok(Self {
            inner: RwLock::new(Inner {
                table,
                journal: Some(journal),
            }),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<R>>, StoreError> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<R>>, StoreError> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    fn save(&self, mut record: R) -> Result<R, StoreError> {
        record.validate()?;

        let id = match (record.id(), R::ID_POLICY) {
            (Some(id), _) => id,
            (None, IdPolicy::Generated) => {
                let id = RecordId::from(Uuid::new_v4().to_string());
                record.assign_id(id.clone());
                id
            }
            (None, IdPolicy::Natural) => {
                return Err(ValidationError::MissingField {
                    table: R::TABLE,
                    field: R::ID_FIELD,
                }
                .into())
            }
        };

        let mut inner = self.write()?;
        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::Save { record: &record })?;
        }
        let inserted = inner.table.upsert(id.clone(), record.clone());

        tracing::debug!(table = R::TABLE, id = %id, inserted, "Record saved");
        Ok(record)
    }

    fn find_all(&self) -> Result<RecordSet<R>, StoreError> {
        let inner = self.read()?;
        Ok(inner.table.rows.values().cloned().collect())
    }

    fn find_by_field(&self, field: &str, value: &FieldValue) -> Result<RecordSet<R>, StoreError> {
        if field == R::ID_FIELD {
            let FieldValue::String(id) = value else {
                return Ok(RecordSet::default());
            };
            let inner = self.read()?;
            return Ok(inner.table.get(&RecordId::from(id.as_str())).cloned().into_iter().collect());
        }

        if !R::is_indexed(field) {
            return Err(ValidationError::UnknownIndex {
                table: R::TABLE,
                field: field.to_string(),
            }
            .into());
        }

        let inner = self.read()?;
        Ok(inner.table.lookup(field, value))
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<R>, StoreError> {
        let inner = self.read()?;
        Ok(inner.table.get(id).cloned())
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if !inner.table.slots.contains_key(id) {
            tracing::debug!(table = R::TABLE, id = %id, "Nothing to delete");
            return Ok(false);
        }

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::<&R>::Delete { id: id.clone() })?;
        }
        inner.table.remove(id);

        tracing::debug!(table = R::TABLE, id = %id, "Record deleted");
        Ok(true)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.table.rows.len())
    }
}
