//! STORE-method ZIP container assembly (spec §4.5).
//!
//! Grounded on the teacher's `fast_writer::streaming_zip_writer::StreamingZipWriter`,
//! despecialized from DEFLATE-with-data-descriptor to STORE-with-known-size:
//! every part's full bytes are known before this writer ever sees them (the
//! orchestrator collects per-sheet/per-part bytes first), so there is no need
//! for a data descriptor or a streaming compressor, so sizes and the CRC-32
//! go straight into the local header. No ZIP64; xlsx packages stay well
//! under 4 GiB.

use crc32fast::Hasher as Crc32;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_DIR_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;
const VERSION_NEEDED: u16 = 20;
const VERSION_MADE_BY: u16 = 20;

/// One file destined for a ZIP entry.
pub struct ZipEntry {
    pub path: String,
    pub data: Vec<u8>,
}

impl ZipEntry {
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        ZipEntry {
            path: path.into(),
            data,
        }
    }
}

struct Written {
    path: String,
    crc32: u32,
    size: u32,
    offset: u32,
}

/// Assemble `entries` into a STORE-method ZIP archive, in the order given.
/// Callers are responsible for ordering `[Content_Types].xml` first per
/// spec §4.5's convention.
pub fn write_store_zip(entries: Vec<ZipEntry>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut written = Vec::with_capacity(entries.len());

    for entry in entries {
        let offset = out.len() as u32;
        let crc32 = {
            let mut hasher = Crc32::new();
            hasher.update(&entry.data);
            hasher.finalize()
        };
        let size = entry.data.len() as u32;
        let (dos_time, dos_date) = dos_timestamp_now();
        let name = entry.path.as_bytes();

        out.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // general purpose flag
        out.extend_from_slice(&0u16.to_le_bytes()); // method = STORE
        out.extend_from_slice(&dos_time.to_le_bytes());
        out.extend_from_slice(&dos_date.to_le_bytes());
        out.extend_from_slice(&crc32.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes()); // compressed size
        out.extend_from_slice(&size.to_le_bytes()); // uncompressed size
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra length
        out.extend_from_slice(name);
        out.extend_from_slice(&entry.data);

        written.push(Written {
            path: entry.path,
            crc32,
            size,
            offset,
        });
    }

    let central_dir_offset = out.len() as u32;
    for entry in &written {
        let (dos_time, dos_date) = dos_timestamp_now();
        let name = entry.path.as_bytes();

        out.extend_from_slice(&CENTRAL_DIR_SIG.to_le_bytes());
        out.extend_from_slice(&VERSION_MADE_BY.to_le_bytes());
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // general purpose flag
        out.extend_from_slice(&0u16.to_le_bytes()); // method = STORE
        out.extend_from_slice(&dos_time.to_le_bytes());
        out.extend_from_slice(&dos_date.to_le_bytes());
        out.extend_from_slice(&entry.crc32.to_le_bytes());
        out.extend_from_slice(&entry.size.to_le_bytes());
        out.extend_from_slice(&entry.size.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra length
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        out.extend_from_slice(&entry.offset.to_le_bytes());
        out.extend_from_slice(name);
    }
    let central_dir_size = out.len() as u32 - central_dir_offset;

    out.extend_from_slice(&EOCD_SIG.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // disk number
    out.extend_from_slice(&0u16.to_le_bytes()); // disk with central dir
    out.extend_from_slice(&(written.len() as u16).to_le_bytes());
    out.extend_from_slice(&(written.len() as u16).to_le_bytes());
    out.extend_from_slice(&central_dir_size.to_le_bytes());
    out.extend_from_slice(&central_dir_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length

    out
}

/// DOS date/time stamp for "now", the default entry mtime (spec §4.5).
fn dos_timestamp_now() -> (u16, u16) {
    use chrono::{Datelike, Local, Timelike};
    let now = Local::now();
    let time = ((now.hour() as u16) << 11)
        | ((now.minute() as u16) << 5)
        | ((now.second() as u16) / 2);
    let year = (now.year() - 1980).max(0) as u16;
    let date = (year << 9) | ((now.month() as u16) << 5) | (now.day() as u16);
    (time, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn single_entry_round_trips_through_a_hand_rolled_reader() {
        let archive = write_store_zip(vec![ZipEntry::new("hello.txt", b"hello world".to_vec())]);

        assert_eq!(u32_at(&archive, 0), LOCAL_HEADER_SIG);
        // method field (offset 8) must be 0 (STORE)
        assert_eq!(u16_at(&archive, 8), 0);

        let eocd_sig_bytes = EOCD_SIG.to_le_bytes();
        let eocd_pos = archive
            .windows(4)
            .rposition(|w| w == eocd_sig_bytes)
            .expect("eocd present");
        let entry_count = u16_at(&archive, eocd_pos + 10);
        assert_eq!(entry_count, 1);

        let cd_offset = u32_at(&archive, eocd_pos + 16) as usize;
        assert_eq!(u32_at(&archive, cd_offset), CENTRAL_DIR_SIG);
        let cd_crc = u32_at(&archive, cd_offset + 16);
        let mut hasher = Crc32::new();
        hasher.update(b"hello world");
        assert_eq!(cd_crc, hasher.finalize());
    }

    #[test]
    fn content_types_entry_stays_first() {
        let archive = write_store_zip(vec![
            ZipEntry::new("[Content_Types].xml", b"a".to_vec()),
            ZipEntry::new("xl/workbook.xml", b"b".to_vec()),
        ]);
        // the first local header's filename follows a fixed 30-byte header
        let name_len = u16_at(&archive, 26) as usize;
        let name = &archive[30..30 + name_len];
        assert_eq!(name, b"[Content_Types].xml");
    }

    #[test]
    fn multiple_entries_produce_matching_central_directory_offsets() {
        let archive = write_store_zip(vec![
            ZipEntry::new("a.xml", vec![1, 2, 3]),
            ZipEntry::new("b.xml", vec![4, 5]),
            ZipEntry::new("c.xml", vec![6]),
        ]);
        let eocd_sig_bytes = EOCD_SIG.to_le_bytes();
        let eocd_pos = archive
            .windows(4)
            .rposition(|w| w == eocd_sig_bytes)
            .unwrap();
        assert_eq!(u16_at(&archive, eocd_pos + 10), 3);
    }
}
