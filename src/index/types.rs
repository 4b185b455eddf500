/// Identifier of an indexed file, assigned in index order
pub type FileId = u32;

/// A trigram is a 3-byte sequence stored as u32 (only lower 24 bits used)
pub type Trigram = u32;

/// Magic string at the start of every index file
pub const MAGIC: &[u8] = b"csearch index 1\n";

/// Magic string at the very end of every index file
pub const TRAILER_MAGIC: &[u8] = b"\ncsearch trailr\n";

/// Number of section offsets stored just before the trailer magic
pub const TRAILER_OFFSETS: usize = 5;

/// Posting index entry: trigram (3 bytes) + count (u32) + offset (u32)
pub const POST_ENTRY_SIZE: usize = 3 + 4 + 4;

/// Section offsets read from the index trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub roots: usize,
    pub names: usize,
    pub postings: usize,
    pub name_index: usize,
    pub post_index: usize,
    /// Start of the trailer (end of the post index)
    pub trailer: usize,
}

impl Sections {
    /// Number of files named by the name index (it carries one extra end offset)
    pub fn file_count(&self) -> usize {
        ((self.post_index - self.name_index) / 4).saturating_sub(1)
    }

    /// Number of trigrams in the posting directory
    pub fn post_count(&self) -> usize {
        (self.trailer - self.post_index) / POST_ENTRY_SIZE
    }
}

/// Convert 3 bytes to a trigram
#[inline]
pub fn bytes_to_trigram(b0: u8, b1: u8, b2: u8) -> Trigram {
    ((b0 as u32) << 16) | ((b1 as u32) << 8) | (b2 as u32)
}

/// Convert trigram back to bytes
#[inline]
pub fn trigram_to_bytes(t: Trigram) -> [u8; 3] {
    [
        ((t >> 16) & 0xFF) as u8,
        ((t >> 8) & 0xFF) as u8,
        (t & 0xFF) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigram_packing_is_big_endian() {
        assert_eq!(bytes_to_trigram(b'a', b'b', b'c'), 0x616263);
        assert_eq!(trigram_to_bytes(0x616263), *b"abc");
    }

    #[test]
    fn test_section_counts() {
        let sections = Sections {
            roots: 16,
            names: 20,
            postings: 40,
            name_index: 100,
            post_index: 112,
            trailer: 112 + 2 * POST_ENTRY_SIZE,
        };
        assert_eq!(sections.file_count(), 2);
        assert_eq!(sections.post_count(), 2);
    }
}
