use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, bail};
use flate2::read::DeflateDecoder;
use glob::Pattern;
use log::debug;

use crate::archive::{Archive, ArchiveEntry, ArchiveReader};
use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Opens zip-family archives (zip, jar, xpi, crx) from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipReader;

impl ArchiveReader for ZipReader {
    type Archive = ZipArchive<LocalFileReader>;

    fn open(&self, path: &Path) -> Result<Self::Archive> {
        let open = || -> anyhow::Result<Self::Archive> {
            let reader = LocalFileReader::new(path)?;
            ZipArchive::new(reader)
        };
        open().map_err(|source| Error::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// An open ZIP archive with its central directory loaded.
pub struct ZipArchive<R: ReadAt> {
    /// `None` once closed
    parser: Option<ZipParser<R>>,
    entries: Vec<ZipFileEntry>,
    index: HashMap<String, usize>,
}

impl<R: ReadAt> ZipArchive<R> {
    pub fn new(reader: R) -> anyhow::Result<Self> {
        let parser = ZipParser::new(reader);
        let stored = parser.list_files()?;

        let mut archive = Self {
            parser: Some(parser),
            entries: Vec::with_capacity(stored.len()),
            index: HashMap::with_capacity(stored.len()),
        };
        for entry in stored {
            archive.insert(entry);
        }
        archive.add_synthetic_directories();

        Ok(archive)
    }

    /// Decompress an entry and check it against its recorded size and CRC32.
    pub fn read_entry(&self, entry: &ZipFileEntry) -> anyhow::Result<Vec<u8>> {
        if entry.is_synthetic {
            return Ok(Vec::new());
        }
        if entry.is_encrypted() {
            bail!("Encrypted entries are not supported");
        }

        let parser = self.parser.as_ref().context("archive is closed")?;
        let raw = parser.read_raw(entry)?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflated => {
                // the declared size is untrusted, let the decoder grow the buffer
                let mut out = Vec::new();
                DeflateDecoder::new(raw.as_slice())
                    .take(entry.uncompressed_size.saturating_add(1))
                    .read_to_end(&mut out)
                    .context("corrupt deflate stream")?;
                out
            }
            other => bail!("Unsupported compression method: {other}"),
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "size mismatch: expected {} bytes, got {}",
                entry.uncompressed_size,
                data.len()
            );
        }
        let crc = crc32fast::hash(&data);
        if crc != entry.crc32 {
            bail!("CRC32 mismatch: expected {:08x}, got {:08x}", entry.crc32, crc);
        }

        Ok(data)
    }

    fn insert(&mut self, entry: ZipFileEntry) {
        if self.index.contains_key(&entry.file_name) {
            debug!("ignoring duplicate entry {}", entry.file_name);
            return;
        }
        self.index.insert(entry.file_name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Add a directory entry for every ancestor that is implied by an entry
    /// name but not stored.
    fn add_synthetic_directories(&mut self) {
        let mut missing = Vec::new();
        for entry in &self.entries {
            let name = &entry.file_name;
            for (pos, _) in name.match_indices('/') {
                if pos == 0 || pos + 1 == name.len() {
                    continue;
                }
                let dir = &name[..=pos];
                if !self.index.contains_key(dir) && !missing.iter().any(|m| m == dir) {
                    missing.push(dir.to_string());
                }
            }
        }

        for dir in missing {
            debug!("synthesizing directory entry {dir}");
            self.insert(ZipFileEntry::synthetic_directory(dir));
        }
    }

    fn lookup(&self, name: &str) -> Result<&ZipFileEntry> {
        if self.parser.is_none() {
            return Err(closed());
        }
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::EntryNotFound {
                entry: name.to_string(),
            })
    }
}

impl<R: ReadAt> Archive for ZipArchive<R> {
    fn entry_names(&self, glob: Option<&str>) -> Result<Vec<String>> {
        if self.parser.is_none() {
            return Err(closed());
        }
        let pattern = glob
            .map(Pattern::new)
            .transpose()
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        Ok(self
            .entries
            .iter()
            .filter(|e| pattern.as_ref().is_none_or(|p| p.matches(&e.file_name)))
            .map(|e| e.file_name.clone())
            .collect())
    }

    fn entry(&self, name: &str) -> Result<ArchiveEntry> {
        let entry = self.lookup(name)?;
        Ok(ArchiveEntry {
            name: entry.file_name.clone(),
            is_directory: entry.is_directory,
            is_synthetic: entry.is_synthetic,
            compression_method: entry.compression_method.as_u16(),
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            crc32: entry.crc32,
            last_modified: entry.last_modified_micros(),
        })
    }

    fn extract(&mut self, name: &str, dest: &Path) -> Result<()> {
        let entry = self.lookup(name)?;

        let write = || -> anyhow::Result<()> {
            if entry.is_directory {
                fs::create_dir_all(dest)?;
                return Ok(());
            }
            let data = self.read_entry(entry)?;
            let mut file = fs::File::create(dest)?;
            file.write_all(&data)?;
            Ok(())
        };

        write().map_err(|source| Error::Extract {
            entry: name.to_string(),
            path: dest.to_path_buf(),
            source,
        })
    }

    fn test(&self, name: &str) -> Result<()> {
        let entry = self.lookup(name)?;
        self.read_entry(entry)
            .map(|_| ())
            .map_err(|e| Error::Integrity {
                entry: name.to_string(),
                reason: format!("{e:#}"),
            })
    }

    fn close(&mut self) {
        if self.parser.take().is_some() {
            debug!("archive closed");
        }
    }
}

fn closed() -> Error {
    Error::Io(io::Error::other("archive is closed"))
}
