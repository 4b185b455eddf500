use crate::index::types::{Trigram, bytes_to_trigram};

/// Bitset for tracking which trigrams have been seen.
/// Uses 2MB to cover all 16M possible trigram values (24 bits).
struct TrigramBitset {
    bits: Vec<u64>,
}

impl TrigramBitset {
    /// Create a new bitset (2MB allocation, zeroed)
    #[inline]
    fn new() -> Self {
        // 16M trigrams / 64 bits per u64 = 262144 u64s = 2MB
        Self {
            bits: vec![0u64; 262144],
        }
    }

    #[inline]
    fn set(&mut self, trigram: Trigram) {
        let idx = (trigram >> 6) as usize;
        self.bits[idx] |= 1u64 << (trigram & 63);
    }

    /// Collect all set trigrams in ascending order
    fn collect(&self) -> Vec<Trigram> {
        let mut result = Vec::with_capacity(8192);
        for (word_idx, &word) in self.bits.iter().enumerate() {
            if word == 0 {
                continue;
            }
            let base = (word_idx as u32) << 6;
            let mut w = word;
            while w != 0 {
                let bit_pos = w.trailing_zeros();
                result.push(base | bit_pos);
                w &= w - 1; // clear lowest set bit
            }
        }
        result
    }
}

/// Extract the sorted, unique trigrams of a file's content.
///
/// Small inputs use sort+dedup; larger ones go through a bitset so that
/// deduplication needs no hashing.
pub fn extract_trigrams(content: &[u8]) -> Vec<Trigram> {
    if content.len() < 3 {
        return Vec::new();
    }

    if content.len() < 1024 {
        let mut trigrams: Vec<Trigram> = content
            .windows(3)
            .map(|w| bytes_to_trigram(w[0], w[1], w[2]))
            .collect();
        trigrams.sort_unstable();
        trigrams.dedup();
        return trigrams;
    }

    let mut bitset = TrigramBitset::new();
    for window in content.windows(3) {
        bitset.set(bytes_to_trigram(window[0], window[1], window[2]));
    }
    bitset.collect()
}

/// Every length-3 window of `bytes`, in order, duplicates included
pub fn string_trigrams(bytes: &[u8]) -> impl Iterator<Item = Trigram> + '_ {
    bytes.windows(3).map(|w| bytes_to_trigram(w[0], w[1], w[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_trigrams() {
        let trigrams = extract_trigrams(b"hello");
        assert_eq!(trigrams.len(), 3); // "hel", "ell", "llo"
        assert!(trigrams.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_extract_trigrams_small() {
        assert_eq!(extract_trigrams(b"").len(), 0);
        assert_eq!(extract_trigrams(b"ab").len(), 0);
        assert_eq!(extract_trigrams(b"abc").len(), 1);
    }

    #[test]
    fn test_extract_trigrams_bitset_path_is_sorted() {
        let content: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();
        let trigrams = extract_trigrams(&content);
        assert!(trigrams.len() < content.len());
        assert!(trigrams.windows(2).all(|w| w[0] < w[1]));

        let mut expected: Vec<Trigram> = string_trigrams(&content).collect();
        expected.sort_unstable();
        expected.dedup();
        assert_eq!(trigrams, expected);
    }

    #[test]
    fn test_string_trigrams_keeps_order() {
        let trigrams: Vec<Trigram> = string_trigrams(b"abcd").collect();
        assert_eq!(
            trigrams,
            vec![bytes_to_trigram(b'a', b'b', b'c'), bytes_to_trigram(b'b', b'c', b'd')]
        );
    }
}
