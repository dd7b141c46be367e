/// Which passes to run for one archive. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Write a `<name>-metadata.txt` report next to the archive.
    pub extract_metadata: bool,
    /// Extract the archive into a `<name>` directory next to it.
    pub extract_files: bool,
    /// Reveal the destination directory once extraction succeeds.
    pub open_dir_when_done: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            extract_metadata: false,
            extract_files: true,
            open_dir_when_done: false,
        }
    }
}
