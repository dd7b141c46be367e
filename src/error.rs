use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why writing an output file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    Locked,
    ReadOnly,
    AccessDenied,
    Other,
}

impl WriteErrorKind {
    /// Classify an I/O error raised while writing an output file.
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ResourceBusy | io::ErrorKind::WouldBlock => return Self::Locked,
            io::ErrorKind::ReadOnlyFilesystem => return Self::ReadOnly,
            io::ErrorKind::PermissionDenied => return Self::AccessDenied,
            _ => {}
        }

        // ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
        #[cfg(windows)]
        if matches!(err.raw_os_error(), Some(32) | Some(33)) {
            return Self::Locked;
        }

        Self::Other
    }
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteErrorKind::Locked => f.write_str("file is locked"),
            WriteErrorKind::ReadOnly => f.write_str("file is readonly"),
            WriteErrorKind::AccessDenied => f.write_str("access is denied"),
            WriteErrorKind::Other => f.write_str("write failed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{} is corrupted or is not a ZIP file", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create directory: {}", path.display())]
    DirectoryCreate { path: PathBuf, source: io::Error },

    #[error("failed to extract '{entry}' to {}", path.display())]
    Extract {
        entry: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("entry '{entry}' resolves outside the destination directory")]
    UnsafeEntryPath { entry: String },

    #[error("cannot write {}: {kind}", path.display())]
    Write {
        kind: WriteErrorKind,
        path: PathBuf,
        source: io::Error,
    },

    #[error("integrity check failed for '{entry}': {reason}")]
    Integrity { entry: String, reason: String },

    #[error("no entry named '{entry}' in archive")]
    EntryNotFound { entry: String },

    #[error("could not read the archive selection")]
    Prompt(#[source] dialoguer::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Wrap a write failure, classifying its cause.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            kind: WriteErrorKind::classify(&source),
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
