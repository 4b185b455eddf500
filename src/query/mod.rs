//! From a regex to a candidate file list.
//!
//! [`compile`] turns the pattern into a [`Query`], [`QueryExecutor`] evaluates
//! it over posting lists, and [`CandidateFilter`] applies the name filters.

pub mod compiler;
pub mod executor;
pub mod filter;
pub mod string_set;
pub mod trigram_query;

pub use compiler::{RegexInfo, analyze, compile};
pub use executor::{QueryExecutor, intersect, union};
pub use filter::{CandidateFilter, validate_glob};
pub use string_set::StringSet;
pub use trigram_query::Query;
