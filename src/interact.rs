//! Talking to the person running the tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use dialoguer::{Confirm, Input};
use log::{debug, warn};

use crate::error::{Error, Result};

/// Extensions offered by the archive prompt without a second question.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "xpi", "jar", "ja", "crx"];

pub trait UserInteraction {
    /// Ask for the archive to process.
    ///
    /// `Ok(None)` means the user cancelled. A prompt that could not be
    /// shown or read is an error, not a cancellation.
    fn select_archive(&self) -> Result<Option<PathBuf>>;

    fn notify(&self, message: &str);

    fn notify_error(&self, message: &str);

    /// Show a directory in the platform file manager.
    fn reveal(&self, path: &Path);
}

/// Prompts on the terminal, reports on stdout/stderr.
#[derive(Debug, Default)]
pub struct TerminalInteraction {
    /// Skip confirmation questions.
    assume_yes: bool,
}

impl TerminalInteraction {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl UserInteraction for TerminalInteraction {
    fn select_archive(&self) -> Result<Option<PathBuf>> {
        let input: String = Input::new()
            .with_prompt("Select zip archive (*.zip, *.xpi, *.jar, *.ja, *.crx)")
            .allow_empty(true)
            .interact_text()
            .map_err(Error::Prompt)?;

        let Some(path) = parse_selection(&input) else {
            return Ok(None);
        };

        if !self.assume_yes && !has_archive_extension(&path) {
            let proceed = Confirm::new()
                .with_prompt(format!("{} does not look like a zip archive, open anyway?", path.display()))
                .default(false)
                .interact()
                .map_err(Error::Prompt)?;
            if !proceed {
                return Ok(None);
            }
        }
        Ok(Some(path))
    }

    fn notify(&self, message: &str) {
        println!("{message}\n");
    }

    fn notify_error(&self, message: &str) {
        eprintln!("{message}\n");
    }

    fn reveal(&self, path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };

        debug!("revealing {} with {opener}", path.display());
        if let Err(e) = Command::new(opener).arg(path).spawn() {
            warn!("could not open {}: {e}", path.display());
        }
    }
}

/// The path typed at the prompt, with surrounding quotes removed.
/// Blank input is a cancellation.
pub fn parse_selection(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'');
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
