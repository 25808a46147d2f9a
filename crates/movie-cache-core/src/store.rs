use crate::error::StoreError;
use crate::store_file::StoreFile;
use movie_cache_models::{InvalidUpdate, MovieId, MovieRecord, MovieUpdate};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Outcome of a best-effort batch upsert.
#[derive(Debug, Default)]
pub struct UpsertReport {
    /// Ids committed, in input order
    pub stored: Vec<MovieId>,
    /// Records rejected before touching the store; their siblings still commit
    pub skipped: Vec<(MovieId, InvalidUpdate)>,
}

/// Durable key-value store of movie records keyed by movie id.
///
/// Reads share the lock and run concurrently. Every mutation holds the write
/// lock across the in-memory change and the snapshot commit, so an upsert can
/// never interleave with a favorite flip on the same record. When the commit
/// fails the in-memory change is undone before the lock is released.
pub struct LocalStore {
    records: RwLock<HashMap<MovieId, MovieRecord>>,
    file: Option<StoreFile>,
}

impl LocalStore {
    /// A store with no backing file. Nothing survives the process.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            file: None,
        }
    }

    /// Open (or create on first commit) a file-backed store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file = StoreFile::new(path);
        let records = file.load()?;
        Ok(Self {
            records: RwLock::new(records),
            file: Some(file),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<MovieId, MovieRecord>>, StoreError> {
        self.records.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<MovieId, MovieRecord>>, StoreError> {
        self.records.write().map_err(|_| StoreError::Poisoned)
    }

    fn commit(&self, records: &HashMap<MovieId, MovieRecord>) -> Result<(), StoreError> {
        match &self.file {
            Some(file) => file.save(records),
            None => Ok(()),
        }
    }

    pub fn get(&self, id: MovieId) -> Result<Option<MovieRecord>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Batch point lookup. Unknown ids are simply absent from the result.
    pub fn get_by_ids<I>(&self, ids: I) -> Result<HashMap<MovieId, MovieRecord>, StoreError>
    where
        I: IntoIterator<Item = MovieId>,
    {
        let records = self.read()?;
        Ok(ids
            .into_iter()
            .filter_map(|id| records.get(&id).map(|r| (id, r.clone())))
            .collect())
    }

    /// Insert a new record or merge into the existing one. Idempotent.
    pub fn upsert(&self, update: &MovieUpdate) -> Result<MovieRecord, StoreError> {
        update.validate()?;

        let mut records = self.write()?;
        let previous = records.get(&update.id).cloned();
        let merged = apply(&mut records, update);

        if let Err(e) = self.commit(&records) {
            restore(&mut records, update.id, previous);
            return Err(e);
        }
        debug!("Upserted movie {}", update.id);
        Ok(merged)
    }

    /// Upsert a batch under one lock and one commit.
    ///
    /// Invalid records are skipped and reported; the rest of the batch still
    /// commits. If the commit itself fails, the whole batch is rolled back.
    pub fn upsert_many(&self, updates: &[MovieUpdate]) -> Result<UpsertReport, StoreError> {
        let mut report = UpsertReport::default();
        let mut records = self.write()?;
        let mut undo = Vec::with_capacity(updates.len());

        for update in updates {
            if let Err(e) = update.validate() {
                warn!("Skipping movie {}: {}", update.id, e);
                report.skipped.push((update.id, e));
                continue;
            }
            undo.push((update.id, records.get(&update.id).cloned()));
            apply(&mut records, update);
            report.stored.push(update.id);
        }

        if report.stored.is_empty() {
            return Ok(report);
        }

        if let Err(e) = self.commit(&records) {
            for (id, previous) in undo.into_iter().rev() {
                restore(&mut records, id, previous);
            }
            return Err(e);
        }
        debug!("Upserted {} movies ({} skipped)", report.stored.len(), report.skipped.len());
        Ok(report)
    }

    /// Atomic read-modify-write of the favorite flag.
    pub fn set_favorite(&self, id: MovieId, value: bool) -> Result<MovieRecord, StoreError> {
        let mut records = self.write()?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let previous = record.is_favorite;
        record.is_favorite = value;
        let updated = record.clone();

        if let Err(e) = self.commit(&records) {
            if let Some(record) = records.get_mut(&id) {
                record.is_favorite = previous;
            }
            return Err(e);
        }
        debug!("Movie {} favorite set to {}", id, value);
        Ok(updated)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Drop every record, favorites included.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.write()?;
        let previous = std::mem::take(&mut *records);
        if let Err(e) = self.commit(&records) {
            *records = previous;
            return Err(e);
        }
        Ok(previous.len())
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        self.file.as_ref().map(|f| f.path())
    }
}

fn apply(records: &mut HashMap<MovieId, MovieRecord>, update: &MovieUpdate) -> MovieRecord {
    let record = records
        .entry(update.id)
        .and_modify(|existing| existing.merge(update))
        .or_insert_with(|| MovieRecord::from_update(update));
    record.clone()
}

fn restore(records: &mut HashMap<MovieId, MovieRecord>, id: MovieId, previous: Option<MovieRecord>) {
    match previous {
        Some(record) => {
            records.insert(id, record);
        }
        None => {
            records.remove(&id);
        }
    }
}
