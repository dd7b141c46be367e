//! One run: pick an archive, resolve destinations, run the requested passes.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use log::info;

use crate::archive::ArchiveReader;
use crate::error::{Error, Result, WriteErrorKind};
use crate::extract::ArchiveExtractor;
use crate::interact::UserInteraction;
use crate::naming::unique_path;
use crate::options::Options;
use crate::report::MetadataReporter;

/// Result of each pass that was requested.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Path of the written report.
    pub metadata: Option<Result<PathBuf>>,
    /// Directory the archive was extracted into.
    pub files: Option<Result<PathBuf>>,
}

impl Outcome {
    /// `true` when no requested pass failed.
    pub fn is_success(&self) -> bool {
        [&self.metadata, &self.files]
            .into_iter()
            .flatten()
            .all(|r| r.is_ok())
    }
}

/// Ask for an archive when `source` is `None`, then process it.
///
/// Returns `Ok(None)` when the user cancelled the selection. A failing
/// prompt is reported through `ui` and returned.
pub fn run<R, U>(
    reader: &R,
    ui: &U,
    source: Option<PathBuf>,
    options: Options,
) -> Result<Option<Outcome>>
where
    R: ArchiveReader,
    U: UserInteraction,
{
    let source = match source {
        Some(source) => source,
        None => match ui.select_archive() {
            Ok(Some(selected)) => selected,
            Ok(None) => {
                info!("no archive selected");
                return Ok(None);
            }
            Err(e) => {
                ui.notify_error(&error_message(&e));
                return Err(e);
            }
        },
    };
    Ok(Some(process_archive(reader, ui, &source, options)))
}

/// Run the metadata and extraction passes for `source`.
///
/// The passes are independent: a failing report does not stop the
/// extraction and neither rolls the other back.
pub fn process_archive<R, U>(reader: &R, ui: &U, source: &Path, options: Options) -> Outcome
where
    R: ArchiveReader,
    U: UserInteraction,
{
    let mut outcome = Outcome::default();

    if options.extract_metadata {
        let report_path = unique_path(&report_candidate(source));
        info!("writing metadata for {} to {}", source.display(), report_path.display());

        let result = MetadataReporter::new(reader).report(source, &report_path);
        match &result {
            Ok(_) => ui.notify(&format!(
                "Metadata extraction complete:\n\n{}",
                report_path.display()
            )),
            Err(e) => ui.notify_error(&error_message(e)),
        }
        outcome.metadata = Some(result.map(|_| report_path));
    }

    if options.extract_files {
        let dest = unique_path(&extract_candidate(source));
        info!("extracting {} into {}", source.display(), dest.display());

        let result = ArchiveExtractor::new(reader).extract(source, &dest);
        match &result {
            Ok(_) => {
                ui.notify(&format!("File extraction complete:\n\n{}", dest.display()));
                if options.open_dir_when_done {
                    ui.reveal(&dest);
                }
            }
            Err(e) => ui.notify_error(&error_message(e)),
        }
        outcome.files = Some(result.map(|_| dest));
    }

    outcome
}

/// `<dir>/<stem>`, before collision handling.
pub fn extract_candidate(source: &Path) -> PathBuf {
    parent_dir(source).join(stem(source))
}

/// `<dir>/<stem>-metadata.txt`, before collision handling.
pub fn report_candidate(source: &Path) -> PathBuf {
    let mut name = stem(source);
    name.push("-metadata.txt");
    parent_dir(source).join(name)
}

fn parent_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn stem(source: &Path) -> std::ffi::OsString {
    source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "archive".into())
}

/// User-facing text for a failed pass, followed by the cause chain.
pub fn error_message(err: &Error) -> String {
    let headline = match err {
        Error::ArchiveOpen { path, .. } => {
            format!("{}\n\n is corrupted or is not a ZIP file.", path.display())
        }
        Error::DirectoryCreate { path, .. } => {
            format!("Failed to create directory:\n\n{}", path.display())
        }
        Error::Extract { path, .. } => format!("Failed to extract file:\n\n{}", path.display()),
        Error::UnsafeEntryPath { entry } => {
            format!("Refusing to extract outside the destination directory:\n\n{entry}")
        }
        Error::Write { kind, path, .. } => match kind {
            WriteErrorKind::Locked => {
                format!("Write failed because file is locked:\n\n{}", path.display())
            }
            WriteErrorKind::ReadOnly => {
                format!("Write failed because file is readonly:\n\n{}", path.display())
            }
            WriteErrorKind::AccessDenied => {
                format!("Write failed because access is denied:\n\n{}", path.display())
            }
            WriteErrorKind::Other => format!("Can't create output file:\n\n{}", path.display()),
        },
        Error::Prompt(_) => "Could not read the archive selection.".to_string(),
        other => return other.to_string(),
    };

    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    if causes.is_empty() {
        headline
    } else {
        format!("{headline}\n\n{}", causes.join(": "))
    }
}
