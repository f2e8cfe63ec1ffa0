#![no_main]
use libfuzzer_sys::fuzz_target;

use flatimg_core::{encode_entry, ImageSrc, ENTRY_HEAD_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut src = data;
    let header = match src.read_header() {
        Ok(header) => header,
        Err(_) => return,
    };

    for _ in 0..header.count() {
        match src.read_entry() {
            Ok(entry) => {
                // Anything that decodes re-encodes to a record of the same length
                let encoded = encode_entry(&entry.name, &entry.content);
                assert_eq!(encoded.len(), ENTRY_HEAD_SIZE + entry.content.len());
            }
            Err(_) => return,
        }
    }
});
