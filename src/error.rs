use std::io;

use thiserror::Error;

/// Failures reading or writing the acceptor's stable storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("[STORAGE ERROR]: {0}")]
    Io(#[from] io::Error),

    #[error("[STORAGE ERROR]: failed to serialize state: {0}")]
    Encode(bincode::Error),

    #[error("[STORAGE ERROR]: failed to deserialize state: {0}")]
    Decode(bincode::Error),

    #[error("[STORAGE ERROR]: record truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("[STORAGE ERROR]: not an acceptor state record")]
    BadMagic,

    #[error("[STORAGE ERROR]: unsupported record version {0}")]
    UnsupportedVersion(u8),

    #[error("[STORAGE ERROR]: {} is in use by another acceptor", .0.display())]
    Locked(std::path::PathBuf),

    #[error("[STORAGE ERROR]: checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },
}

/// Errors surfaced by the acceptor node and its clients.
///
/// Protocol rejections are never errors; they travel as `Response` variants.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("[IO ERROR]: {0}")]
    Io(#[from] io::Error),

    #[error("[CODEC ERROR]: {0}")]
    Codec(#[from] bincode::Error),

    #[error("[INTERNAL ERROR]: acceptor worker is not running")]
    Unavailable,

    #[error("connection closed")]
    Closed,

    #[error("request failed on remote node: {0}")]
    Remote(String),
}
