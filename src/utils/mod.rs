//! Utility functions shared by the index reader, writer and query compiler.
//!
//! - [`encoding`] - Variable-length integers and posting-list deltas
//! - [`trigram`] - 3-byte sequence extraction
//!
//! ```
//! use csearch::utils::extract_trigrams;
//!
//! // "hel", "ell", "llo", ...
//! let trigrams = extract_trigrams(b"hello world");
//! assert_eq!(trigrams.len(), 9);
//! ```

pub mod encoding;
pub mod trigram;

pub use encoding::*;
pub use trigram::*;
