use crate::index::types::*;
use crate::utils::{encode_postings, extract_trigrams, put_u32_be};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// In-memory builder for the on-disk index format.
///
/// This is not a directory walker: callers hand it `(name, content)` pairs in
/// the order the file ids should be assigned.
#[derive(Debug, Default)]
pub struct IndexWriter {
    roots: Vec<String>,
    /// Raw path bytes; need not be UTF-8
    names: Vec<Vec<u8>>,
    /// Trigram -> ascending file ids
    postings: BTreeMap<Trigram, Vec<FileId>>,
}

impl IndexWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an indexed root path
    pub fn add_root(&mut self, root: impl Into<String>) {
        self.roots.push(root.into());
    }

    /// Add a file and return its id. Names must not contain NUL bytes.
    pub fn add_file(&mut self, name: impl Into<Vec<u8>>, content: &[u8]) -> FileId {
        let id = self.names.len() as FileId;
        let name = name.into();
        debug_assert!(!name.contains(&0), "file names cannot contain NUL");
        self.names.push(name);

        for trigram in extract_trigrams(content) {
            self.postings.entry(trigram).or_default().push(id);
        }
        id
    }

    /// Number of files added so far
    pub fn file_count(&self) -> usize {
        self.names.len()
    }

    /// Serialize the whole index
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);

        let roots = out.len();
        for root in &self.roots {
            out.extend_from_slice(root.as_bytes());
            out.push(0);
        }
        out.push(0);

        let names = out.len();
        let mut name_offsets = Vec::with_capacity(self.names.len() + 1);
        for name in &self.names {
            name_offsets.push((out.len() - names) as u32);
            out.extend_from_slice(name);
            out.push(0);
        }
        // The end offset points at the terminating empty name.
        name_offsets.push((out.len() - names) as u32);
        out.push(0);

        let postings = out.len();
        let mut directory = Vec::with_capacity(self.postings.len());
        for (&trigram, ids) in &self.postings {
            directory.push((trigram, ids.len() as u32, (out.len() - postings) as u32));
            out.extend_from_slice(&trigram_to_bytes(trigram));
            encode_postings(ids, &mut out);
        }

        let name_index = out.len();
        for offset in name_offsets {
            put_u32_be(&mut out, offset);
        }

        let post_index = out.len();
        for (trigram, count, offset) in directory {
            out.extend_from_slice(&trigram_to_bytes(trigram));
            put_u32_be(&mut out, count);
            put_u32_be(&mut out, offset);
        }

        for offset in [roots, names, postings, name_index, post_index] {
            put_u32_be(&mut out, offset as u32);
        }
        out.extend_from_slice(TRAILER_MAGIC);
        out
    }

    /// Write the index to `path`, replacing any existing file atomically
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push("~");

        let mut file = BufWriter::new(File::create(&tmp)?);
        file.write_all(&self.to_bytes())?;
        file.into_inner().map_err(|e| e.into_error())?.sync_all()?;

        fs::rename(&tmp, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::read_u32_be;

    #[test]
    fn test_empty_index_layout() {
        let bytes = IndexWriter::new().to_bytes();
        assert!(bytes.starts_with(MAGIC));
        assert!(bytes.ends_with(TRAILER_MAGIC));

        // magic, empty roots, empty names, one name-index end offset, 5 offsets
        let expected = MAGIC.len() + 1 + 1 + 4 + TRAILER_OFFSETS * 4 + TRAILER_MAGIC.len();
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn test_posting_directory_is_sorted() {
        let mut writer = IndexWriter::new();
        writer.add_file("b", b"zzzaaa");
        writer.add_file("a", b"aaazzz");
        let bytes = writer.to_bytes();

        let trailer = bytes.len() - TRAILER_MAGIC.len() - TRAILER_OFFSETS * 4;
        let post_index = read_u32_be(&bytes, trailer + 16).unwrap() as usize;
        let entries: Vec<Trigram> = bytes[post_index..trailer]
            .chunks(POST_ENTRY_SIZE)
            .map(|e| bytes_to_trigram(e[0], e[1], e[2]))
            .collect();
        assert!(entries.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(entries.len(), writer.postings.len());
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut writer = IndexWriter::new();
        assert_eq!(writer.add_file("first", b""), 0);
        assert_eq!(writer.add_file("second", b""), 1);
        assert_eq!(writer.file_count(), 2);
    }
}
