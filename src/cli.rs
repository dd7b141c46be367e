use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::options::Options;

#[derive(Parser, Debug)]
#[command(name = "unzipx")]
#[command(version)]
#[command(about = "Extract zip/jar/xpi/crx archives and report entry metadata", long_about = None)]
#[command(after_help = "Examples:\n  \
  unzipx addon.xpi              extract into ./addon (or ./addon(2), ...)\n  \
  unzipx -m omni.ja             also write omni-metadata.txt\n  \
  unzipx -M ext.crx             only write ext-metadata.txt\n  \
  unzipx                        prompt for the archive")]
pub struct Cli {
    /// Archive to process (prompted for when omitted)
    #[arg(value_name = "ARCHIVE")]
    pub archive: Option<PathBuf>,

    /// Also write a <name>-metadata.txt report
    #[arg(short = 'm', long = "metadata")]
    pub metadata: bool,

    /// Only write the metadata report, do not extract files
    #[arg(short = 'M', long = "metadata-only", conflicts_with = "metadata")]
    pub metadata_only: bool,

    /// Open the extracted directory when done
    #[arg(short = 'o', long = "open")]
    pub open: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            extract_metadata: self.metadata || self.metadata_only,
            extract_files: !self.metadata_only,
            open_dir_when_done: self.open,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
