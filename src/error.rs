//! Error types for csearch.
//!
//! Each layer either recovers (per-file read errors surface as [`GrepError::Read`]
//! and are logged by the caller) or propagates up to [`SearchError`].

use crate::index::types::FileId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level search error. Everything that reaches `main` is fatal.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("writing results failed: {0}")]
    Output(#[source] io::Error),
}

/// Errors opening or decoding the on-disk index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("cannot open index {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt index {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("file id {id} out of range (index has {count} files)")]
    FileIdOutOfRange { id: FileId, count: u32 },

    #[error("cannot locate index: $CSEARCHINDEX is unset and there is no home directory")]
    NoLocation,
}

/// Invalid user-supplied patterns.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid regexp {pattern:?}: {source}")]
    Syntax {
        pattern: String,
        #[source]
        source: Box<regex_syntax::Error>,
    },

    #[error("invalid regexp {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{pattern:?} is an invalid glob: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Errors raised while scanning a single candidate file.
#[derive(Error, Debug)]
pub enum GrepError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("writing results failed: {0}")]
    Write(#[source] io::Error),
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Result type alias for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
