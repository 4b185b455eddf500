//! Opening candidate files through content filters.
//!
//! A filter pairs a path regex with a function that wraps the byte stream
//! (for example a gzip decoder). Every filter whose regex matches the path is
//! applied once, in registration order, so the outermost wrapper is the last
//! one registered. Dropping the returned stream closes every layer.

use crate::error::PatternError;
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Byte stream handed to the grep engine
pub type Stream = Box<dyn Read>;

/// Wraps a stream in a decoding layer
pub type WrapFn = fn(Stream) -> io::Result<Stream>;

struct Filter {
    name: &'static str,
    pattern: Regex,
    wrap: WrapFn,
}

/// Ordered list of path-triggered stream filters
#[derive(Default)]
pub struct FilterRegistry {
    filters: Vec<Filter>,
}

impl FilterRegistry {
    /// A registry with no filters; files are read as-is
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by the command line: gzip for `*.gz`
    pub fn standard() -> Result<Self, PatternError> {
        let mut registry = Self::new();
        registry.register("gzip", r"\.gz$", gunzip)?;
        Ok(registry)
    }

    /// Append a filter applied to paths matching `pattern`
    pub fn register(
        &mut self,
        name: &'static str,
        pattern: &str,
        wrap: WrapFn,
    ) -> Result<&mut Self, PatternError> {
        let pattern = Regex::new(pattern).map_err(|source| PatternError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        self.filters.push(Filter { name, pattern, wrap });
        Ok(self)
    }

    /// Names of the filters that apply to `path`, in application order
    pub fn filters_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.filters
            .iter()
            .filter(move |f| f.pattern.is_match(path))
            .map(|f| f.name)
    }

    /// Apply every matching filter to an already-open stream
    pub fn wrap(&self, path: &str, mut stream: Stream) -> io::Result<Stream> {
        for filter in &self.filters {
            if filter.pattern.is_match(path) {
                stream = (filter.wrap)(stream)?;
            }
        }
        Ok(stream)
    }

    /// Open `path` and apply its filters.
    ///
    /// Filters see the path with invalid UTF-8 replaced; the file itself is
    /// opened by its exact name.
    pub fn open(&self, path: &Path) -> io::Result<Stream> {
        let file = File::open(path)?;
        self.wrap(&path.to_string_lossy(), Box::new(file))
    }
}

/// Decompress every gzip member in the stream
fn gunzip(stream: Stream) -> io::Result<Stream> {
    Ok(Box::new(MultiGzDecoder::new(BufReader::new(stream))))
}
