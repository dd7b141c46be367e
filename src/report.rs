//! Per-entry metadata report.
//!
//! Entries are listed in lexicographic order of their full name. Each
//! block carries an integrity check whose failure is recorded as `FAIL`
//! without stopping the report.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat};
use log::{info, warn};

use crate::archive::{Archive, ArchiveEntry, ArchiveReader};
use crate::error::{Error, Result};
use crate::zip::CompressionMethod;

/// What a reporting pass wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub entries: usize,
    pub integrity_failures: usize,
}

/// Builds and writes metadata reports.
pub struct MetadataReporter<'a, R: ArchiveReader> {
    reader: &'a R,
}

impl<'a, R: ArchiveReader> MetadataReporter<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Write the report for `archive_path` to `report_path` as UTF-8.
    pub fn report(&self, archive_path: &Path, report_path: &Path) -> Result<ReportSummary> {
        let mut archive = self.reader.open(archive_path)?;
        let rendered = render_report(&archive);
        archive.close();

        let (text, summary) = rendered?;
        fs::write(report_path, text).map_err(|e| Error::write(report_path, e))?;

        info!(
            "wrote metadata for {} entries to {} ({} failed integrity check)",
            summary.entries,
            report_path.display(),
            summary.integrity_failures
        );
        Ok(summary)
    }
}

/// Render the full report text for an open archive.
pub fn render_report<A: Archive>(archive: &A) -> Result<(String, ReportSummary)> {
    let mut names = archive.entry_names(None)?;
    names.sort();

    let mut summary = ReportSummary {
        entries: names.len(),
        integrity_failures: 0,
    };
    let mut out = format!("{} entries found:\n\n", names.len());

    for name in &names {
        let entry = archive.entry(name)?;
        let passed = match archive.test(name) {
            Ok(()) => true,
            Err(e) => {
                warn!("{e}");
                summary.integrity_failures += 1;
                false
            }
        };
        out.push_str(&render_entry(&entry, passed));
    }

    Ok((out, summary))
}

/// One entry block, terminated by a blank line.
pub fn render_entry(entry: &ArchiveEntry, integrity_passed: bool) -> String {
    let mut block = String::new();
    let method = CompressionMethod::from_u16(entry.compression_method);

    // writing into a String cannot fail
    let _ = writeln!(block, "{}", entry.name);
    let _ = writeln!(block, "   CompressionMethod:  {method}");
    let _ = writeln!(block, "   compressedSize:     {}", entry.compressed_size);
    let _ = writeln!(block, "   uncompressedSize:   {}", entry.uncompressed_size);
    let _ = writeln!(block, "   isDirectory:        {}", entry.is_directory);
    let _ = writeln!(block, "   isSynthetic:        {}", entry.is_synthetic);
    let _ = writeln!(
        block,
        "   lastModifiedTime:   {} ({})",
        entry.last_modified,
        iso8601(entry.last_modified)
    );
    let _ = writeln!(block, "   CRC32:              {}", entry.crc32);
    let _ = writeln!(
        block,
        "   IntegrityCheck:     {}",
        if integrity_passed { "Pass" } else { "FAIL" }
    );
    block.push('\n');
    block
}

/// UTC, millisecond precision, `Z` suffix.
fn iso8601(micros: i64) -> String {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "Invalid Date".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, compression_method: u16) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            is_directory: name.ends_with('/'),
            is_synthetic: false,
            compression_method,
            compressed_size: 12,
            uncompressed_size: 34,
            crc32: 3_632_233_996,
            last_modified: 1_505_999_130_123_456,
        }
    }

    #[test]
    fn block_layout() {
        let block = render_entry(&entry("install.rdf", 8), true);
        assert_eq!(
            block,
            "install.rdf\n\
             \x20  CompressionMethod:  8 (DEFLATED)\n\
             \x20  compressedSize:     12\n\
             \x20  uncompressedSize:   34\n\
             \x20  isDirectory:        false\n\
             \x20  isSynthetic:        false\n\
             \x20  lastModifiedTime:   1505999130123456 (2017-09-21T13:05:30.123Z)\n\
             \x20  CRC32:              3632233996\n\
             \x20  IntegrityCheck:     Pass\n\
             \n"
        );
    }

    #[test]
    fn compression_codes() {
        assert!(render_entry(&entry("a", 129), true).contains("CompressionMethod:  129 (MOZ_JAR_BROTLI)\n"));
        assert!(render_entry(&entry("a", 42), true).contains("CompressionMethod:  42\n"));
    }

    #[test]
    fn failed_check_is_upper_case() {
        assert!(render_entry(&entry("a", 0), false).contains("IntegrityCheck:     FAIL\n"));
    }

    #[test]
    fn timestamps() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(315_532_800_000_000), "1980-01-01T00:00:00.000Z");
    }
}
