//! # Summary
//!
//! This module abstracts over stable storage. To survive a crash, the acceptor
//! must persist its promises and accepted values before answering.
//!
//! `FileStore` serializes the whole `AcceptorState` with `bincode` into a
//! checksummed record, writes it to a temporary file, fsyncs it, and renames it
//! over the previous record. A reader therefore sees either the old record or
//! the new one, never a mix. An exclusive advisory lock on `acceptor.lock`
//! keeps a second process from opening the same directory while the first
//! still owns it. `MemoryStore` keeps the record in memory for ephemeral
//! nodes and tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StorageError;
use crate::layout::Layout;
use crate::state::AcceptorState;

const FILE_NAME: &str = "acceptor.state";
const TEMP_NAME: &str = "acceptor.state.tmp";
const LOCK_NAME: &str = "acceptor.lock";

const MAGIC: &[u8; 4] = b"LAYO";
const VERSION: u8 = 1;

/// magic (4) + version (1) + length (4) + checksum (4)
const HEADER_LEN: usize = 13;

/// Atomic load and save of a single acceptor's state.
pub trait Store<L: Layout>: Send {
    /// Returns the last saved state, or the unbootstrapped default.
    fn load(&self) -> Result<AcceptorState<L>, StorageError>;

    /// Durably replaces the saved state. Must not return before the
    /// record is on stable storage.
    fn save(&mut self, state: &AcceptorState<L>) -> Result<(), StorageError>;
}

impl<L: Layout, S: Store<L> + ?Sized> Store<L> for Box<S> {
    fn load(&self) -> Result<AcceptorState<L>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, state: &AcceptorState<L>) -> Result<(), StorageError> {
        (**self).save(state)
    }
}

/// Persistent storage rooted in a node's log directory.
#[derive(Debug)]
pub struct FileStore<L> {
    dir: PathBuf,

    /// Held for as long as the store is open; released on drop
    _lock: fs::File,

    _marker: std::marker::PhantomData<fn() -> L>,
}

impl<L: Layout> FileStore<L> {
    /// Opens (creating if needed) the store in `dir`, discarding any
    /// half-written record left by a crash. Fails with `Locked` if another
    /// store already has `dir` open.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let lock = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(dir.join(LOCK_NAME))?;
        if let Err(error) = lock.try_lock_exclusive() {
            if error.kind() == fs2::lock_contended_error().kind() {
                return Err(StorageError::Locked(dir))
            }
            return Err(error.into())
        }
        let temp = dir.join(TEMP_NAME);
        if temp.exists() {
            warn!("discarding partial record {}", temp.display());
            fs::remove_file(&temp)?;
        }
        Ok(FileStore {
            dir,
            _lock: lock,
            _marker: Default::default(),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }
}

impl<L: Layout> Store<L> for FileStore<L> {
    fn load(&self) -> Result<AcceptorState<L>, StorageError> {
        match fs::read(self.path()) {
        | Ok(bytes) => decode(&bytes),
        | Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(AcceptorState::default()),
        | Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, state: &AcceptorState<L>) -> Result<(), StorageError> {
        let record = encode(state)?;
        let temp = self.dir.join(TEMP_NAME);
        let mut file = fs::File::create(&temp)?;
        file.write_all(&record)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, self.path())?;
        sync_dir(&self.dir)?;
        trace!("saved {} byte record to {}", record.len(), self.dir.display());
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StorageError> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_: &Path) -> Result<(), StorageError> {
    Ok(())
}

/// Volatile storage for nodes that do not need to survive restarts.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Default(bound = ""))]
pub struct MemoryStore<L: Layout> {
    state: AcceptorState<L>,
}

impl<L: Layout> MemoryStore<L> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Layout> Store<L> for MemoryStore<L> {
    fn load(&self) -> Result<AcceptorState<L>, StorageError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &AcceptorState<L>) -> Result<(), StorageError> {
        self.state = state.clone();
        Ok(())
    }
}

fn encode<L: Layout>(state: &AcceptorState<L>) -> Result<Vec<u8>, StorageError> {
    let payload = bincode::serialize(state).map_err(StorageError::Encode)?;
    let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
    record.extend_from_slice(MAGIC);
    record.push(VERSION);
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(&crc32c::crc32c(&payload).to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

fn decode<L: Layout>(record: &[u8]) -> Result<AcceptorState<L>, StorageError> {
    if record.len() < HEADER_LEN {
        return Err(StorageError::Truncated {
            expected: HEADER_LEN,
            actual: record.len(),
        });
    }
    if &record[0..4] != MAGIC {
        return Err(StorageError::BadMagic);
    }
    if record[4] != VERSION {
        return Err(StorageError::UnsupportedVersion(record[4]));
    }
    let len = u32::from_le_bytes([record[5], record[6], record[7], record[8]]) as usize;
    let expected = u32::from_le_bytes([record[9], record[10], record[11], record[12]]);
    let payload = &record[HEADER_LEN..];
    if payload.len() != len {
        return Err(StorageError::Truncated {
            expected: HEADER_LEN + len,
            actual: record.len(),
        });
    }
    let actual = crc32c::crc32c(payload);
    if actual != expected {
        return Err(StorageError::Checksum { expected, actual });
    }
    bincode::deserialize(payload).map_err(StorageError::Decode)
}
