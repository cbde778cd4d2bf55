//! Append-only result store backed by a single JSON file
//!
//! Directory layout:
//! ```text
//! {data_dir}/
//! ├── respostas.json          # JSON array of every accepted record
//! ├── .respostas.json.lock    # advisory writer lock (cross-process)
//! └── .respostas.json.tmp     # staging file, only present mid-write
//! ```
//!
//! Writers hold an in-process mutex and an exclusive `flock` on the lock
//! file for the whole read-modify-write. The new collection is written to
//! the staging file, fsynced and renamed over the backing file, so a reader
//! never needs the lock: it sees either the previous or the new version.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fs2::FileExt;

use crate::error::StoreError;
use crate::record::ResultRecord;

/// Backing file name used when none is configured.
pub const DEFAULT_FILE_NAME: &str = "respostas.json";

/// Store for the ordered collection of submitted results.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct ResultStore {
    data_dir: PathBuf,
    file_name: String,
    file_path: PathBuf,
    writer: Mutex<()>,
}

/// Held for the duration of one read-modify-write.
struct WriterGuard<'a> {
    _local: MutexGuard<'a, ()>,
    lock_file: File,
    lock_path: PathBuf,
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            log::warn!("failed to release {}: {e}", self.lock_path.display());
        }
    }
}

impl ResultStore {
    /// Create a store for `{data_dir}/respostas.json`. Touches nothing on disk.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_file_name(data_dir, DEFAULT_FILE_NAME)
    }

    /// Create a store with a custom backing file name inside `data_dir`.
    pub fn with_file_name(data_dir: &Path, file_name: &str) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            file_name: file_name.to_string(),
            file_path: data_dir.join(file_name),
            writer: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn tmp_path(&self) -> PathBuf {
        self.data_dir.join(format!(".{}.tmp", self.file_name))
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!(".{}.lock", self.file_name))
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    /// Make sure the data directory exists. Safe to call any number of times.
    pub fn ensure_storage_ready(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Init {
            path: self.data_dir.clone(),
            source,
        })?;
        log::debug!("data directory ready: {}", self.data_dir.display());
        Ok(())
    }

    /// Create the backing file as an empty collection if it is absent.
    ///
    /// Returns `true` if the file was created. An existing file is never
    /// touched, even when it is unreadable.
    pub fn init_collection(&self) -> Result<bool, StoreError> {
        self.ensure_storage_ready()?;
        let _guard = self.lock_writer()?;

        if self.file_path.exists() {
            return Ok(false);
        }
        self.write_collection(&[])?;
        log::info!("initialized empty collection at {}", self.file_path.display());
        Ok(true)
    }

    /// Append one record and persist the whole collection.
    ///
    /// Returns the collection length after the append. On error the backing
    /// file is left exactly as it was.
    pub fn append(&self, record: ResultRecord) -> Result<usize, StoreError> {
        self.ensure_storage_ready()?;
        let _guard = self.lock_writer()?;

        let mut records = match self.read_collection()? {
            Some(records) => records,
            None => {
                log::info!(
                    "{} not found, starting a new collection",
                    self.file_path.display()
                );
                Vec::new()
            }
        };
        records.push(record);
        self.write_collection(&records)?;

        log::debug!(
            "appended record #{} to {}",
            records.len(),
            self.file_path.display()
        );
        Ok(records.len())
    }

    /// Load the full collection.
    ///
    /// A missing file is `StoreError::NotFound`, which is not the same as an
    /// initialized collection with zero records.
    pub fn load_all(&self) -> Result<Vec<ResultRecord>, StoreError> {
        self.read_collection()?
            .ok_or_else(|| StoreError::NotFound {
                path: self.file_path.clone(),
            })
    }

    /// Read and parse the backing file. `None` if it does not exist.
    fn read_collection(&self) -> Result<Option<Vec<ResultRecord>>, StoreError> {
        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.file_path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.file_path.clone(),
                source,
            })
    }

    /// Replace the backing file with `records` using write-fsync-rename.
    fn write_collection(&self, records: &[ResultRecord]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(records).map_err(|source| StoreError::Encode { source })?;

        let tmp_path = self.tmp_path();
        if let Err(source) = write_replace(&tmp_path, &self.file_path, json.as_bytes()) {
            if let Err(e) = fs::remove_file(&tmp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("failed to remove staging file {}: {e}", tmp_path.display());
                }
            }
            return Err(StoreError::Write {
                path: self.file_path.clone(),
                source,
            });
        }

        // The rename already happened; a failed directory sync only weakens
        // crash durability, so it is not reported as a failed write.
        if let Err(e) = sync_dir(&self.data_dir) {
            log::warn!("failed to sync {}: {e}", self.data_dir.display());
        }
        Ok(())
    }

    /// Take the in-process writer mutex, then the cross-process file lock.
    fn lock_writer(&self) -> Result<WriterGuard<'_>, StoreError> {
        // The mutex guards no in-memory state, so a poisoned lock is still usable.
        let local = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let lock_path = self.lock_path();
        let lock_err = |source| StoreError::Write {
            path: lock_path.clone(),
            source,
        };
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_err)?;
        FileExt::lock_exclusive(&lock_file).map_err(lock_err)?;

        Ok(WriterGuard {
            _local: local,
            lock_file,
            lock_path,
        })
    }
}

fn write_replace(tmp_path: &Path, final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, final_path)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
