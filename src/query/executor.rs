use crate::error::IndexResult;
use crate::index::PostingSource;
use crate::index::types::FileId;
use crate::query::trigram_query::Query;
use std::cmp::Ordering;

/// Evaluates trigram queries against posting lists
pub struct QueryExecutor<'a, S: PostingSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: PostingSource + ?Sized> QueryExecutor<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Ids of the files that may satisfy `query`, strictly ascending
    pub fn execute(&self, query: &Query) -> IndexResult<Vec<FileId>> {
        match query {
            Query::All => Ok(self.source.all_files()),
            Query::None => Ok(Vec::new()),
            Query::And { trigrams, subs } => {
                // Sort by size for efficient intersection
                let mut ordered: Vec<_> = trigrams.iter().copied().collect();
                ordered.sort_by_cached_key(|&t| self.source.posting_count(t));

                let mut result: Option<Vec<FileId>> = None;
                for t in ordered {
                    let list = self.source.list_for_trigram(t)?;
                    let next = match result {
                        Some(existing) => intersect(&existing, &list),
                        None => list,
                    };
                    if next.is_empty() {
                        return Ok(next);
                    }
                    result = Some(next);
                }

                for sub in subs {
                    let list = self.execute(sub)?;
                    let next = match result {
                        Some(existing) => intersect(&existing, &list),
                        None => list,
                    };
                    if next.is_empty() {
                        return Ok(next);
                    }
                    result = Some(next);
                }

                Ok(result.unwrap_or_else(|| self.source.all_files()))
            }
            Query::Or { trigrams, subs } => {
                let mut result = Vec::new();
                for &t in trigrams {
                    result = union(&result, &self.source.list_for_trigram(t)?);
                }
                for sub in subs {
                    result = union(&result, &self.execute(sub)?);
                }
                Ok(result)
            }
        }
    }
}

/// Ids present in both ascending lists
pub fn intersect(a: &[FileId], b: &[FileId]) -> Vec<FileId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Ids present in either ascending list
pub fn union(a: &[FileId], b: &[FileId]) -> Vec<FileId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
