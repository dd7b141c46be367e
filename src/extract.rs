//! Two-phase extraction: every directory entry first, then every file.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};

use crate::archive::{Archive, ArchiveReader, DIRECTORY_GLOB};
use crate::error::{Error, Result};

/// What an extraction pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories_created: usize,
    pub files_extracted: usize,
    /// Targets that already existed and were left untouched.
    pub skipped: usize,
}

/// Materialises an archive's contents under a destination root.
pub struct ArchiveExtractor<'a, R: ArchiveReader> {
    reader: &'a R,
}

impl<'a, R: ArchiveReader> ArchiveExtractor<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Extract `archive_path` into `dest_root`.
    ///
    /// Existing targets are skipped, so re-running into a populated
    /// directory resumes instead of overwriting. The first failure aborts
    /// the pass and leaves whatever was already written in place.
    pub fn extract(&self, archive_path: &Path, dest_root: &Path) -> Result<ExtractSummary> {
        let mut archive = self.reader.open(archive_path)?;
        let result = extract_all(&mut archive, dest_root);
        archive.close();

        if let Ok(summary) = &result {
            info!(
                "extracted {} into {}: {} directories, {} files, {} skipped",
                archive_path.display(),
                dest_root.display(),
                summary.directories_created,
                summary.files_extracted,
                summary.skipped
            );
        }
        result
    }
}

fn extract_all<A: Archive>(archive: &mut A, root: &Path) -> Result<ExtractSummary> {
    let mut summary = ExtractSummary::default();

    create_dir(root, &mut summary)?;

    for name in archive.entry_names(Some(DIRECTORY_GLOB))? {
        let target = resolve_entry_path(root, &name)?;
        create_dir(&target, &mut summary)?;
    }

    for name in archive.entry_names(None)? {
        let target = resolve_entry_path(root, &name)?;
        if fs::symlink_metadata(&target).is_ok() {
            debug!("skipping {name}: {} exists", target.display());
            summary.skipped += 1;
            continue;
        }

        // archives without directory entries for every ancestor
        if let Some(parent) = target.parent() {
            create_dir(parent, &mut summary)?;
        }

        archive.extract(&name, &target)?;
        ensure_owner_read_write(&target).map_err(|source| Error::Extract {
            entry: name.clone(),
            path: target.clone(),
            source: source.into(),
        })?;
        debug!("extracted {name}");
        summary.files_extracted += 1;
    }

    Ok(summary)
}

fn create_dir(path: &Path, summary: &mut ExtractSummary) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("created directory {}", path.display());
    summary.directories_created += 1;
    Ok(())
}

/// Join an entry name onto `root` one `/`-separated segment at a time.
///
/// Names that would land outside `root` (absolute names, `..`, drive
/// prefixes, embedded platform separators) are rejected.
pub fn resolve_entry_path(root: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_entry = || Error::UnsafeEntryPath {
        entry: name.to_string(),
    };

    if name.starts_with('/') {
        return Err(unsafe_entry());
    }

    let mut target = root.to_path_buf();
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == OsStr::new(segment) => {
                target.push(part)
            }
            _ => return Err(unsafe_entry()),
        }
    }
    Ok(target)
}

#[cfg(unix)]
fn ensure_owner_read_write(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    if mode & 0o600 != 0o600 {
        perms.set_mode(mode | 0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_read_write(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
