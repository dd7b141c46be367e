#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use unzipx::{Archive, ArchiveEntry, ArchiveReader, Error, UserInteraction, ZipReader};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub enum Item<'a> {
    Dir(&'a str),
    Deflated(&'a str, &'a [u8]),
    Stored(&'a str, &'a [u8]),
}

pub fn write_zip(path: &Path, items: &[Item]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for item in items {
        match item {
            Item::Dir(name) => writer.add_directory(*name, stored).unwrap(),
            Item::Deflated(name, data) => {
                writer.start_file(*name, deflated).unwrap();
                writer.write_all(data).unwrap();
            }
            Item::Stored(name, data) => {
                writer.start_file(*name, stored).unwrap();
                writer.write_all(data).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

/// Write an archive holding `ok.txt` and a DEFLATED `big.bin` whose
/// central directory claims an uncompressed size of `u64::MAX` through a
/// ZIP64 extra field. The `zip` crate refuses to produce such a file.
pub fn write_oversized_zip(path: &Path) {
    use flate2::Compression;
    use flate2::write::DeflateEncoder;

    fn u16le(out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&v.to_le_bytes());
    }
    fn u32le(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"small after all").unwrap();
    let big = encoder.finish().unwrap();

    // (name, method, stored bytes, crc, uncompressed size)
    let entries: [(&str, u16, &[u8], u32, u64); 2] = [
        ("ok.txt", 0, b"fine", crc32fast::hash(b"fine"), 4),
        ("big.bin", 8, &big, crc32fast::hash(b"small after all"), u64::MAX),
    ];

    let mut out = Vec::new();
    let mut central = Vec::new();
    for (name, method, data, crc, size) in entries {
        let offset = out.len() as u32;
        let zip64 = size >= 0xFFFFFFFF;
        let size32 = if zip64 { 0xFFFFFFFF } else { size as u32 };

        out.extend_from_slice(b"PK\x03\x04");
        for v in [10, 0, method, 0, 0x21] {
            u16le(&mut out, v);
        }
        for v in [crc, data.len() as u32, size32] {
            u32le(&mut out, v);
        }
        u16le(&mut out, name.len() as u16);
        u16le(&mut out, 0);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        central.extend_from_slice(b"PK\x01\x02");
        for v in [45, 10, 0, method, 0, 0x21] {
            u16le(&mut central, v);
        }
        for v in [crc, data.len() as u32, size32] {
            u32le(&mut central, v);
        }
        for v in [name.len() as u16, if zip64 { 12 } else { 0 }, 0, 0, 0] {
            u16le(&mut central, v);
        }
        u32le(&mut central, 0);
        u32le(&mut central, offset);
        central.extend_from_slice(name.as_bytes());
        if zip64 {
            u16le(&mut central, 0x0001);
            u16le(&mut central, 8);
            central.extend_from_slice(&size.to_le_bytes());
        }
    }

    let cd_offset = out.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(b"PK\x05\x06");
    for v in [0, 0, 2, 2] {
        u16le(&mut out, v);
    }
    u32le(&mut out, central.len() as u32);
    u32le(&mut out, cd_offset);
    u16le(&mut out, 0);
    fs::write(path, out).unwrap();
}

/// Overwrite the first byte of `needle` inside the archive file.
pub fn corrupt(path: &Path, needle: &[u8]) {
    let mut bytes = fs::read(path).unwrap();
    let pos = bytes
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("needle present in archive");
    bytes[pos] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

/// Relative paths of every file and directory under `root`, `/`-joined,
/// directories with a trailing `/`.
pub fn list_tree(root: &Path) -> BTreeSet<String> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if path.is_dir() {
                out.insert(format!("{rel}/"));
                walk(root, &path, out);
            } else {
                out.insert(rel);
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(root, root, &mut out);
    out
}

/// Records every notification instead of printing it.
#[derive(Default)]
pub struct RecordingUi {
    pub selection: Option<PathBuf>,
    pub messages: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    pub revealed: RefCell<Vec<PathBuf>>,
    pub prompts: Cell<usize>,
    /// The prompt cannot be read, as when stdin is not a terminal.
    pub broken_prompt: bool,
}

impl UserInteraction for RecordingUi {
    fn select_archive(&self) -> unzipx::Result<Option<PathBuf>> {
        self.prompts.set(self.prompts.get() + 1);
        if self.broken_prompt {
            return Err(Error::Prompt(dialoguer::Error::IO(io::Error::other(
                "not a terminal",
            ))));
        }
        Ok(self.selection.clone())
    }

    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn notify_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn reveal(&self, path: &Path) {
        self.revealed.borrow_mut().push(path.to_path_buf());
    }
}

/// Wraps [`ZipReader`] and counts how often handles are closed.
#[derive(Default)]
pub struct CountingReader {
    pub closes: Rc<Cell<usize>>,
}

pub struct Counted<A> {
    inner: A,
    closes: Rc<Cell<usize>>,
}

impl ArchiveReader for CountingReader {
    type Archive = Counted<<ZipReader as ArchiveReader>::Archive>;

    fn open(&self, path: &Path) -> unzipx::Result<Self::Archive> {
        Ok(Counted {
            inner: ZipReader.open(path)?,
            closes: Rc::clone(&self.closes),
        })
    }
}

impl<A: Archive> Archive for Counted<A> {
    fn entry_names(&self, glob: Option<&str>) -> unzipx::Result<Vec<String>> {
        self.inner.entry_names(glob)
    }

    fn entry(&self, name: &str) -> unzipx::Result<ArchiveEntry> {
        self.inner.entry(name)
    }

    fn extract(&mut self, name: &str, dest: &Path) -> unzipx::Result<()> {
        self.inner.extract(name, dest)
    }

    fn test(&self, name: &str) -> unzipx::Result<()> {
        self.inner.test(name)
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
        self.inner.close();
    }
}

pub fn fake_entry(name: &str) -> ArchiveEntry {
    ArchiveEntry {
        name: name.to_string(),
        is_directory: name.ends_with('/'),
        is_synthetic: false,
        compression_method: 8,
        compressed_size: 10,
        uncompressed_size: 20,
        crc32: 1234,
        last_modified: 0,
    }
}

/// An in-memory archive that enumerates entries in the order given.
#[derive(Clone, Default)]
pub struct FakeArchive {
    pub entries: Vec<ArchiveEntry>,
    pub data: HashMap<String, Vec<u8>>,
    /// `entry()` fails for these
    pub broken: HashSet<String>,
    /// `test()` fails for these
    pub failing: HashSet<String>,
    pub closes: Rc<Cell<usize>>,
}

impl FakeArchive {
    pub fn with_files(names: &[&str]) -> Self {
        let mut archive = Self::default();
        for name in names {
            archive.entries.push(fake_entry(name));
            archive
                .data
                .insert(name.to_string(), format!("contents of {name}").into_bytes());
        }
        archive
    }
}

impl ArchiveReader for FakeArchive {
    type Archive = FakeArchive;

    fn open(&self, _path: &Path) -> unzipx::Result<Self::Archive> {
        Ok(self.clone())
    }
}

impl Archive for FakeArchive {
    fn entry_names(&self, glob: Option<&str>) -> unzipx::Result<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| glob.is_none() || e.is_directory)
            .map(|e| e.name.clone())
            .collect())
    }

    fn entry(&self, name: &str) -> unzipx::Result<ArchiveEntry> {
        if self.broken.contains(name) {
            return Err(Error::EntryNotFound {
                entry: name.to_string(),
            });
        }
        self.entries
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound {
                entry: name.to_string(),
            })
    }

    fn extract(&mut self, name: &str, dest: &Path) -> unzipx::Result<()> {
        let entry = self.entry(name)?;
        if entry.is_directory {
            fs::create_dir_all(dest)?;
        } else {
            fs::write(dest, &self.data[name])?;
        }
        Ok(())
    }

    fn test(&self, name: &str) -> unzipx::Result<()> {
        if self.failing.contains(name) {
            return Err(Error::Integrity {
                entry: name.to_string(),
                reason: "CRC32 mismatch".to_string(),
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}
