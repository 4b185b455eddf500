#![no_main]

use csearch::index::{IndexReader, PostingSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must be rejected or read without panicking
    let Ok(reader) = IndexReader::from_bytes(data.to_vec()) else {
        return;
    };
    let _ = reader.roots();
    for id in 0..reader.file_count().min(64) {
        let _ = reader.name(id);
    }
    for t in [0u32, 0x616263, 0xffffff] {
        let _ = reader.posting_count(t);
        let _ = reader.list_for_trigram(t);
    }
});
