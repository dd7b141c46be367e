//! The archive-reading seam.
//!
//! Extraction and reporting only talk to archives through [`ArchiveReader`]
//! and [`Archive`], so the zip decoder in [`crate::zip`] can be swapped for
//! a fake in tests.

use std::path::Path;

use crate::error::Result;

/// Matches every directory entry when passed to [`Archive::entry_names`].
pub const DIRECTORY_GLOB: &str = "*/";

/// One record inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash delimited path, directories end with `/`.
    pub name: String,
    pub is_directory: bool,
    /// Materialised by the reader rather than stored in the archive.
    pub is_synthetic: bool,
    pub compression_method: u16,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    /// Microseconds since the Unix epoch.
    pub last_modified: i64,
}

/// Opens archives.
pub trait ArchiveReader {
    type Archive: Archive;

    /// Fails with [`Error::ArchiveOpen`](crate::Error::ArchiveOpen) when the
    /// source is missing, unreadable, or not a valid container.
    fn open(&self, path: &Path) -> Result<Self::Archive>;
}

/// An open archive handle.
pub trait Archive {
    /// Entry names matching `glob` (all entries for `None`), in no
    /// particular order.
    fn entry_names(&self, glob: Option<&str>) -> Result<Vec<String>>;

    fn entry(&self, name: &str) -> Result<ArchiveEntry>;

    /// Write the entry's contents to `dest`. Directory entries create a
    /// directory.
    fn extract(&mut self, name: &str, dest: &Path) -> Result<()>;

    /// Decompress the entry and verify it against its checksum.
    fn test(&self, name: &str) -> Result<()>;

    /// Release the underlying handle. Safe to call more than once.
    fn close(&mut self);
}
