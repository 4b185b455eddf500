use crate::error::{IndexError, IndexResult};
use crate::index::PostingSource;
use crate::index::types::*;
use crate::utils::{decode_varint, read_u32_be};
use memchr::memchr;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Backing bytes of an open index
enum IndexData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for IndexData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            IndexData::Mapped(mmap) => mmap,
            IndexData::Owned(bytes) => bytes,
        }
    }
}

/// Read-only view of a trigram index.
///
/// Only the trailer is parsed up front; names and posting lists are decoded
/// on demand straight out of the mapping, so opening is O(1) in index size.
pub struct IndexReader {
    path: PathBuf,
    data: IndexData,
    sections: Sections,
    file_count: u32,
    post_count: usize,
}

impl IndexReader {
    /// Memory-map the index at `path`
    pub fn open(path: &Path) -> IndexResult<Self> {
        let open_err = |source| IndexError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();
        if len == 0 {
            return Err(IndexError::Corrupt {
                path: path.to_path_buf(),
                reason: "file is empty".to_string(),
            });
        }

        // SAFETY: the index is never modified in place; a rebuilt index is
        // written to a new file and renamed over the old one.
        let mmap = unsafe { Mmap::map(&file) }.map_err(open_err)?;
        Self::from_data(path.to_path_buf(), IndexData::Mapped(mmap))
    }

    /// Use an in-memory copy of an index file
    pub fn from_bytes(bytes: Vec<u8>) -> IndexResult<Self> {
        Self::from_data(PathBuf::from("<memory>"), IndexData::Owned(bytes))
    }

    fn from_data(path: PathBuf, data: IndexData) -> IndexResult<Self> {
        let sections = match parse_sections(&data) {
            Ok(sections) => sections,
            Err(reason) => return Err(IndexError::Corrupt { path, reason }),
        };

        let file_count = match u32::try_from(sections.file_count()) {
            Ok(count) => count,
            Err(_) => {
                return Err(IndexError::Corrupt {
                    path,
                    reason: "too many files".to_string(),
                });
            }
        };

        Ok(Self {
            post_count: sections.post_count(),
            path,
            data,
            sections,
            file_count,
        })
    }

    /// Path of the index file (or `<memory>`)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct trigrams in the index
    pub fn trigram_count(&self) -> usize {
        self.post_count
    }

    /// Root paths recorded by the index builder
    pub fn roots(&self) -> IndexResult<Vec<String>> {
        let mut roots = Vec::new();
        let mut pos = self.sections.roots;
        loop {
            let s = self.c_str(pos, self.sections.names)?;
            if s.is_empty() {
                break;
            }
            pos += s.len() + 1;
            roots.push(String::from_utf8_lossy(s).into_owned());
        }
        Ok(roots)
    }

    /// Raw bytes of a file's path
    pub fn name_bytes(&self, id: FileId) -> IndexResult<&[u8]> {
        if id >= self.file_count {
            return Err(IndexError::FileIdOutOfRange {
                id,
                count: self.file_count,
            });
        }

        let slot = self.sections.name_index + 4 * id as usize;
        let offset = read_u32_be(&self.data, slot).ok_or_else(|| self.corrupt("name index truncated"))?;
        let start = self
            .sections
            .names
            .checked_add(offset as usize)
            .ok_or_else(|| self.corrupt("name offset overflows"))?;
        self.c_str(start, self.sections.postings)
    }

    /// NUL-terminated string starting at `start`, which must end before `limit`
    fn c_str(&self, start: usize, limit: usize) -> IndexResult<&[u8]> {
        if start >= limit {
            return Err(self.corrupt("string offset out of range"));
        }
        let region = &self.data[start..limit];
        match memchr(0, region) {
            Some(len) => Ok(&region[..len]),
            None => Err(self.corrupt("unterminated string")),
        }
    }

    /// Trigram of the i-th posting directory entry
    fn entry_trigram(&self, i: usize) -> Trigram {
        let at = self.sections.post_index + i * POST_ENTRY_SIZE;
        let d = &self.data[at..at + 3];
        bytes_to_trigram(d[0], d[1], d[2])
    }

    /// (count, offset) of the posting list for `trigram`, if present
    fn find_list(&self, trigram: Trigram) -> Option<(usize, usize)> {
        // Binary search over the sorted directory
        let (mut lo, mut hi) = (0, self.post_count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.entry_trigram(mid) < trigram {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo >= self.post_count || self.entry_trigram(lo) != trigram {
            return None;
        }

        let at = self.sections.post_index + lo * POST_ENTRY_SIZE + 3;
        let count = read_u32_be(&self.data, at)? as usize;
        let offset = read_u32_be(&self.data, at + 4)? as usize;
        Some((count, offset))
    }

    /// Incrementally decode the posting list for `trigram`
    pub fn postings(&self, trigram: Trigram) -> IndexResult<PostingIter<'_>> {
        let Some((count, offset)) = self.find_list(trigram) else {
            return Ok(PostingIter::empty());
        };

        let start = self.sections.postings.saturating_add(offset);
        let end = self.sections.name_index;
        if start.saturating_add(3) > end {
            return Err(self.corrupt("posting offset out of range"));
        }

        let header = &self.data[start..start + 3];
        if bytes_to_trigram(header[0], header[1], header[2]) != trigram {
            return Err(self.corrupt("posting list header does not match directory"));
        }

        Ok(PostingIter {
            data: &self.data[start + 3..end],
            pos: 0,
            last: -1,
            remaining: count,
            limit: self.file_count,
            done: false,
        })
    }

    fn corrupt(&self, reason: &str) -> IndexError {
        IndexError::Corrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl PostingSource for IndexReader {
    fn file_count(&self) -> u32 {
        self.file_count
    }

    fn name_bytes(&self, id: FileId) -> IndexResult<&[u8]> {
        IndexReader::name_bytes(self, id)
    }

    fn posting_count(&self, trigram: Trigram) -> usize {
        self.find_list(trigram).map(|(count, _)| count).unwrap_or(0)
    }

    fn list_for_trigram(&self, trigram: Trigram) -> IndexResult<Vec<FileId>> {
        let iter = self.postings(trigram)?;
        let mut ids = Vec::with_capacity(iter.remaining);
        for id in iter {
            ids.push(id.map_err(|reason| self.corrupt(reason))?);
        }
        Ok(ids)
    }
}

/// Streaming decoder over one delta-encoded posting list
pub struct PostingIter<'a> {
    data: &'a [u8],
    pos: usize,
    last: i64,
    remaining: usize,
    limit: u32,
    done: bool,
}

impl PostingIter<'_> {
    fn empty() -> Self {
        Self {
            data: &[],
            pos: 0,
            last: -1,
            remaining: 0,
            limit: 0,
            done: true,
        }
    }

    fn fail(&mut self, reason: &'static str) -> Option<Result<FileId, &'static str>> {
        self.done = true;
        Some(Err(reason))
    }
}

impl Iterator for PostingIter<'_> {
    type Item = Result<FileId, &'static str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some((delta, consumed)) = decode_varint(&self.data[self.pos..]) else {
            return self.fail("truncated posting list");
        };
        self.pos += consumed;

        if delta == 0 {
            self.done = true;
            if self.remaining != 0 {
                return Some(Err("posting list shorter than its directory count"));
            }
            return None;
        }

        if self.remaining == 0 {
            return self.fail("posting list longer than its directory count");
        }
        self.remaining -= 1;

        self.last += delta as i64;
        if self.last >= self.limit as i64 {
            return self.fail("posting list names a file past the end of the index");
        }
        Some(Ok(self.last as FileId))
    }
}

/// Locate and validate the five section offsets stored in the trailer
fn parse_sections(data: &[u8]) -> Result<Sections, String> {
    let min_len = MAGIC.len() + TRAILER_OFFSETS * 4 + TRAILER_MAGIC.len();
    if data.len() < min_len {
        return Err(format!("file too short ({} bytes)", data.len()));
    }
    if !data.starts_with(MAGIC) {
        return Err("bad header magic".to_string());
    }
    if !data.ends_with(TRAILER_MAGIC) {
        return Err("bad trailer magic".to_string());
    }

    let trailer = data.len() - TRAILER_MAGIC.len() - TRAILER_OFFSETS * 4;
    let mut offsets = [0usize; TRAILER_OFFSETS];
    for (i, slot) in offsets.iter_mut().enumerate() {
        *slot = read_u32_be(data, trailer + 4 * i).ok_or("trailer truncated")? as usize;
    }

    let sections = Sections {
        roots: offsets[0],
        names: offsets[1],
        postings: offsets[2],
        name_index: offsets[3],
        post_index: offsets[4],
        trailer,
    };

    let ordered = [
        MAGIC.len(),
        sections.roots,
        sections.names,
        sections.postings,
        sections.name_index,
        sections.post_index,
        sections.trailer,
    ];
    if ordered.windows(2).any(|w| w[0] > w[1]) {
        return Err("section offsets out of order".to_string());
    }
    if sections.post_index - sections.name_index < 4 || (sections.post_index - sections.name_index) % 4 != 0 {
        return Err("malformed name index".to_string());
    }
    if (sections.trailer - sections.post_index) % POST_ENTRY_SIZE != 0 {
        return Err("malformed posting index".to_string());
    }

    Ok(sections)
}
