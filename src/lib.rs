//! # unzipx
//!
//! Extract zip-family archives (zip, jar, xpi, crx) next to themselves and
//! write human-readable per-entry metadata reports.
//!
//! ## Features
//!
//! - Collision-free destinations: `addon/`, `addon(2)/`, `a(2).tar.gz`, ...
//! - Directory-first extraction that never overwrites existing files
//! - Entry names that would escape the destination are refused
//! - Sorted metadata reports with an integrity check per entry
//! - Archive decoding and user prompts sit behind traits, so the pipeline
//!   runs headless against fakes
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use unzipx::{ArchiveExtractor, MetadataReporter, ZipReader};
//!
//! fn main() -> unzipx::Result<()> {
//!     let reader = ZipReader;
//!     let dest = unzipx::unique_path(Path::new("addon"));
//!     ArchiveExtractor::new(&reader).extract(Path::new("addon.xpi"), &dest)?;
//!
//!     let report = unzipx::unique_path(Path::new("addon-metadata.txt"));
//!     MetadataReporter::new(&reader).report(Path::new("addon.xpi"), &report)?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod extract;
pub mod interact;
pub mod io;
pub mod naming;
pub mod options;
pub mod pipeline;
pub mod report;
pub mod zip;

pub use archive::{Archive, ArchiveEntry, ArchiveReader};
pub use cli::Cli;
pub use error::{Error, Result, WriteErrorKind};
pub use extract::{ArchiveExtractor, ExtractSummary};
pub use interact::{TerminalInteraction, UserInteraction};
pub use naming::unique_path;
pub use options::Options;
pub use pipeline::{Outcome, process_archive, run};
pub use report::{MetadataReporter, ReportSummary};
pub use crate::zip::{ZipArchive, ZipReader};
