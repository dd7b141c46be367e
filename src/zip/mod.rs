//! Built-in ZIP archive reader.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`archive`]: The [`ArchiveReader`](crate::ArchiveReader) implementation
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first, then the Central Directory, so listing never
//! touches entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format and the jar/xpi/crx variants built on it
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - Synthetic directory entries for ancestors the archive does not store
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - Other compression methods are listed but cannot be extracted

mod archive;
mod parser;
mod structures;

pub use archive::{ZipArchive, ZipReader};
pub use parser::ZipParser;
pub use structures::*;
