//! On-disk trigram index.
//!
//! - [`reader`] - Memory-mapped, read-only access to names and posting lists
//! - [`writer`] - Serializer producing the same format (fixtures, benches)
//! - [`paths`] - Where the index lives

pub mod paths;
pub mod reader;
pub mod types;
pub mod writer;

pub use reader::IndexReader;
pub use types::*;
pub use writer::IndexWriter;

use crate::error::IndexResult;
use std::borrow::Cow;

/// The narrow view of an index that query evaluation needs.
pub trait PostingSource {
    /// Number of indexed files; ids are `0..file_count()`
    fn file_count(&self) -> u32;

    /// Path of a file exactly as indexed
    fn name_bytes(&self, id: FileId) -> IndexResult<&[u8]>;

    /// Path of a file for display and name filters. Invalid UTF-8 is
    /// replaced, so use [`PostingSource::name_bytes`] to open the file.
    fn name(&self, id: FileId) -> IndexResult<Cow<'_, str>> {
        Ok(String::from_utf8_lossy(self.name_bytes(id)?))
    }

    /// Length of a trigram's posting list, without decoding it
    fn posting_count(&self, trigram: Trigram) -> usize;

    /// Ascending ids of the files containing `trigram`
    fn list_for_trigram(&self, trigram: Trigram) -> IndexResult<Vec<FileId>>;

    /// Every file id, ascending
    fn all_files(&self) -> Vec<FileId> {
        (0..self.file_count()).collect()
    }
}
