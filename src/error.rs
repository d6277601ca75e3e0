use std::io;
use std::path::PathBuf;

use crate::containers::compression::DecodeError;

pub type Result<T> = std::result::Result<T, AssetError>;

/// Failures surfaced by the search path, asset files and loaders.
///
/// Every variant aborts the load that produced it; nothing in this crate
/// retries or recovers locally.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset '{name}' not found in {searched} search directories")]
    AssetNotFound { name: String, searched: usize },

    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("seek to {target} outside file of {size} bytes")]
    SeekOutOfRange { target: i64, size: u64 },

    #[error(
        "unexpected end of {} at offset {offset}: wanted {requested} bytes, {remaining} left",
        .path.display()
    )]
    UnexpectedEof {
        path: PathBuf,
        offset: u64,
        requested: usize,
        remaining: u64,
    },

    /// An OS failure while reading or repositioning the read cursor.
    /// Reads past the end of the file are [`AssetError::UnexpectedEof`].
    #[error("read or seek in {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to {} failed: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt block in {} at offset {offset}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        offset: u64,
        #[source]
        source: DecodeError,
    },

    #[error("bad header field in {} at offset {offset}: {reason}", .path.display())]
    InvalidHeader {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("cannot serialise summary: {0}")]
    Summary(#[from] serde_json::Error),

    #[error("invalid configuration {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}
