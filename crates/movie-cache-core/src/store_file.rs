use crate::error::StoreError;
use bincode::{deserialize, serialize};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use movie_cache_models::{MovieId, MovieRecord};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk snapshot of the local movie store
///
/// Records are written as a bincode list, gzip-compressed, through a temp
/// file and a rename so a crash never leaves a half-written snapshot.
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty store; an unreadable one
    /// is backed up to `*.bak` and replaced by an empty store.
    pub fn load(&self) -> Result<HashMap<MovieId, MovieRecord>, StoreError> {
        if !self.path.exists() {
            debug!("Store file {:?} does not exist, starting empty", self.path);
            return Ok(HashMap::new());
        }

        let start = std::time::Instant::now();
        let data = std::fs::read(&self.path)?;

        match self.decode(&data) {
            Ok(records) => {
                info!("Loaded {} movie records from {:?} in {:?}", records.len(), self.path, start.elapsed());
                Ok(records.into_iter().map(|r| (r.id, r)).collect())
            }
            Err(e) => {
                let backup_path = self.path.with_extension("bin.bak");
                if let Err(backup_err) = std::fs::copy(&self.path, &backup_path) {
                    warn!(
                        "Store file {:?} is unreadable ({}) and could not be backed up: {}. Starting empty.",
                        self.path, e, backup_err
                    );
                } else {
                    warn!(
                        "Store file {:?} is unreadable ({}). Backed up to {:?}, starting empty.",
                        self.path, e, backup_path
                    );
                }
                Ok(HashMap::new())
            }
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<MovieRecord>, StoreError> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(deserialize(&decompressed)?)
    }

    pub fn save(&self, records: &HashMap<MovieId, MovieRecord>) -> Result<(), StoreError> {
        let mut entries: Vec<&MovieRecord> = records.values().collect();
        entries.sort_by_key(|r| r.id);

        let serialized = serialize(&entries)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&serialized)?;
        let encoded = encoder.finish()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, encoded)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!("Saved {} movie records to {:?}", entries.len(), self.path);
        Ok(())
    }
}
