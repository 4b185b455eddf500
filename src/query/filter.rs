use crate::error::{IndexResult, PatternError};
use crate::index::PostingSource;
use crate::index::types::FileId;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::Path;

/// Narrows candidate ids by file name.
///
/// The `-f` regex sees the full indexed path; include/exclude globs see only
/// the base name.
#[derive(Debug, Default)]
pub struct CandidateFilter {
    file_regex: Option<Regex>,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl CandidateFilter {
    pub fn new(
        file_regex: Option<&str>,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, PatternError> {
        let file_regex = file_regex
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| PatternError::Regex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            file_regex,
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// No restriction configured
    pub fn is_empty(&self) -> bool {
        self.file_regex.is_none() && self.include.is_none() && self.exclude.is_none()
    }

    pub fn accepts(&self, path: &str) -> bool {
        if let Some(re) = &self.file_regex {
            if !re.is_match(path) {
                return false;
            }
        }

        let base = Path::new(path).file_name().map(Path::new).unwrap_or(Path::new(path));
        if let Some(include) = &self.include {
            if !include.is_match(base) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(base) {
                return false;
            }
        }
        true
    }

    /// Keep the ids whose names pass, preserving order
    pub fn apply<S: PostingSource + ?Sized>(
        &self,
        source: &S,
        ids: Vec<FileId>,
    ) -> IndexResult<Vec<FileId>> {
        if self.is_empty() {
            return Ok(ids);
        }

        let mut kept = Vec::with_capacity(ids.len());
        for id in ids {
            if self.accepts(&source.name(id)?) {
                kept.push(id);
            }
        }
        Ok(kept)
    }
}

/// Compile a shell-style glob matched against a single path segment
pub fn validate_glob(pattern: &str) -> Result<Glob, PatternError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| PatternError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

fn build_set(patterns: &[String]) -> Result<Option<GlobSet>, PatternError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(validate_glob(pattern)?);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| PatternError::Glob {
            pattern: patterns.join(" "),
            source,
        })
}
