//! Write-to-temp-then-rename (spec §6): a completed package never appears
//! at its destination path half-written.
//!
//! No teacher analogue in this crate (the teacher writes fast workbooks
//! incrementally, not atomically); grounded on the standard
//! temp-file-in-destination-directory-then-rename-then-fsync pattern, using
//! `tempfile` (already a teacher dev-dependency, promoted to a normal
//! dependency here since this module is library code, not test-only).

use crate::error::{Result, XlsxError};
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `destination` atomically: a `NamedTempFile` is created
/// alongside `destination` (so the final rename stays on one filesystem),
/// written, flushed, and `fsync`'d, then renamed into place. Cancellation is
/// honored before this is ever called (spec §5, §7's "honored at the next
/// sheet boundary"), so there is no partial file to clean up mid-write: the
/// whole package is assembled in memory first, matching the ZIP writer's
/// "collect full bytes before writing" design.
pub fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<()> {
    let dir = destination.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| XlsxError::FileWrite(e.to_string()))?;

    temp.write_all(bytes)
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| XlsxError::FileWrite(e.to_string()))?;

    temp.persist(destination)
        .map_err(|e| XlsxError::FileWrite(e.to_string()))?;

    Ok(())
}
