//! Command line options.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::connectivity::DEFAULT_PROBE_HOST;
use crate::utils::log::LogOptions;

pub mod paths;

use self::paths::LogFile;

/// Where logs go if `--logfile` isn't passed.
pub const DEFAULT_LOG_FILE: &str = "~/updatemac_log.txt";

/// Builds the Opts struct from CLI input and from environment variable input.
#[must_use]
pub fn parse() -> Opts {
    Opts::parse()
}

/**
Updatemac keeps a Mac up to date. It checks macOS (`softwareupdate`), the App Store (`mas`) and
Homebrew (`brew`) for updates in parallel, asks whether to go ahead, then updates everything
that had something pending, again in parallel.

Running `updatemac` without a subcommand is the same as `updatemac run`.

Nothing is checked without an internet connection (a single ping to `--probe-host`). Press
Ctrl-C to abandon a run, and again to exit immediately.

Every log line is also written to `--logfile`, which is replaced on every run.

For debugging, run with `RUST_LIB_BACKTRACE=1` to show error/panic traces.
*/
#[derive(Debug, Parser)]
#[command(version, about, long_about)]
pub struct Opts {
    /// Set the console logging level explicitly (options: Off, Error, Warn, Info, Debug, Trace).
    #[arg(long, short = 'l', default_value = "info", env = "LOG_LEVEL", global = true)]
    pub log_level: LevelFilter,

    /// Set the file logging level explicitly (options: Off, Error, Warn, Info, Debug, Trace).
    #[arg(long, default_value = "debug", env = "FILE_LOG_LEVEL", global = true)]
    pub file_log_level: LevelFilter,

    /// File to write the log to. Parent directories are created, and any previous log is
    /// overwritten.
    #[arg(
        long = "logfile",
        visible_alias = "log-file",
        default_value = DEFAULT_LOG_FILE,
        env = "UPDATEMAC_LOGFILE",
        global = true
    )]
    pub log_file: LogFile,

    /// Whether to color terminal output.
    #[arg(long, value_enum, default_value_t = Color::Auto, ignore_case = true, global = true)]
    pub color: Color,

    /// Don't ask for confirmation before updating.
    #[arg(
        long = "no-interaction",
        visible_alias = "yes",
        short = 'y',
        global = true
    )]
    pub no_interaction: bool,

    /// Only check or update these tasks (comma-separated ids or names, see `updatemac list`).
    /// The default is to run all tasks.
    #[arg(long, value_delimiter = ',', global = true)]
    pub tasks: Vec<String>,

    /// Host to ping to check we're online.
    #[arg(long, default_value = DEFAULT_PROBE_HOST, env = "UPDATEMAC_PROBE_HOST", global = true)]
    pub probe_host: String,

    #[command(subcommand)]
    pub cmd: Option<SubCommand>,
}

impl Opts {
    /// Logging configuration for these options.
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_file: self.log_file.to_path_buf(),
            console_level: self.log_level,
            file_level: self.file_log_level,
            color: self.color.enabled(),
        }
    }
}

/// Settings for colouring output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Color {
    /// Colour on if stdout is a terminal, else off.
    Auto,
    /// Always enable colours.
    Always,
    /// Never enable colours.
    Never,
}

impl Color {
    fn enabled(self) -> bool {
        match self {
            Self::Auto => console::colors_enabled(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

// Optional subcommand (e.g. the "check" in "updatemac check").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum SubCommand {
    /// Check for updates, confirm, then update. If you don't provide a subcommand this is the
    /// default action.
    #[default]
    Run,
    /// Only check for updates, listing the tasks that have some pending.
    Check,
    /// List the available tasks.
    List,
}
