//! # csearch - Indexed Regular Expression Search
//!
//! csearch answers "which lines in which indexed files match this regular
//! expression?" without reading every file. A regex is compiled into a
//! boolean query over trigrams (three-byte substrings), the query is
//! evaluated against posting lists in a pre-built index to get a small set of
//! candidate files, and only those candidates are scanned line by line.
//!
//! ## Architecture
//!
//! - [`index`] - On-disk trigram index (reader, serializer, location)
//! - [`query`] - Regex to trigram query compiler, evaluator and name filters
//! - [`grep`] - Streaming line matcher
//! - [`output`] - grep-compatible output formatting
//! - [`opener`] - Opening files through decompression filters
//! - [`search`] - One search end to end
//! - [`profile`] - Phase timings for `--cpuprofile`
//!
//! ## Quick Start
//!
//! ```
//! use csearch::index::{IndexReader, IndexWriter};
//! use csearch::query::{QueryExecutor, compile};
//!
//! let mut writer = IndexWriter::new();
//! writer.add_file("a.txt", b"hello world\n");
//! writer.add_file("b.txt", b"goodbye\n");
//! let reader = IndexReader::from_bytes(writer.to_bytes()).unwrap();
//!
//! let query = compile("hel+o", false).unwrap();
//! let candidates = QueryExecutor::new(&reader).execute(&query).unwrap();
//! assert_eq!(candidates, vec![0]);
//! ```

pub mod error;
pub mod grep;
pub mod index;
pub mod opener;
pub mod output;
pub mod profile;
pub mod query;
pub mod search;
pub mod utils;

pub use error::{Result, SearchError};
