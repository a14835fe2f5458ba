//! A minimal hand-rolled ZIP central-directory reader, for asserting on the
//! contents of a `.xlsx` package in integration tests without pulling any
//! zip-reading crate into the library itself.
//!
//! Grounded on `xlsxforge::zip`'s own round-trip tests, which decode just
//! enough of the format (central directory + EOCD) to check what the writer
//! produced; this module does the same thing at the file level.

use std::collections::HashMap;
use std::path::Path;

const CENTRAL_DIR_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;

pub struct ZipContents {
    /// Entry name -> uncompressed bytes, in central-directory order.
    entries: HashMap<String, Vec<u8>>,
    pub names: Vec<String>,
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

impl ZipContents {
    /// Read and fully decode every STORE-method entry in `path`.
    pub fn read(path: &Path) -> Self {
        let bytes = std::fs::read(path).expect("xlsx file should be readable");

        let eocd_sig = EOCD_SIG.to_le_bytes();
        let eocd_pos = bytes
            .windows(4)
            .rposition(|w| w == eocd_sig)
            .expect("archive must contain an end-of-central-directory record");

        let entry_count = u16_at(&bytes, eocd_pos + 10) as usize;
        let central_dir_offset = u32_at(&bytes, eocd_pos + 16) as usize;

        let mut names = Vec::with_capacity(entry_count);
        let mut entries = HashMap::with_capacity(entry_count);
        let mut cursor = central_dir_offset;

        for _ in 0..entry_count {
            assert_eq!(
                u32_at(&bytes, cursor),
                CENTRAL_DIR_SIG,
                "expected a central directory record at {cursor}"
            );
            let uncompressed_size = u32_at(&bytes, cursor + 24) as usize;
            let name_len = u16_at(&bytes, cursor + 28) as usize;
            let extra_len = u16_at(&bytes, cursor + 30) as usize;
            let comment_len = u16_at(&bytes, cursor + 32) as usize;
            let local_header_offset = u32_at(&bytes, cursor + 42) as usize;
            let name_start = cursor + 46;
            let name = String::from_utf8(bytes[name_start..name_start + name_len].to_vec())
                .expect("entry name must be utf-8");

            let local_name_len = u16_at(&bytes, local_header_offset + 26) as usize;
            let local_extra_len = u16_at(&bytes, local_header_offset + 28) as usize;
            let data_start = local_header_offset + 30 + local_name_len + local_extra_len;
            let data = bytes[data_start..data_start + uncompressed_size].to_vec();

            names.push(name.clone());
            entries.insert(name, data);
            cursor = name_start + name_len + extra_len + comment_len;
        }

        ZipContents { entries, names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn text(&self, name: &str) -> String {
        String::from_utf8(
            self.entries
                .get(name)
                .unwrap_or_else(|| panic!("entry '{name}' not found in archive"))
                .clone(),
        )
        .expect("entry should be utf-8 xml")
    }
}
