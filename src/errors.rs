use std::io;

use camino::Utf8PathBuf;
use displaydoc::Display;
use thiserror::Error;

use crate::tasks::Phase;

#[derive(Error, Debug, Display)]
/// Errors thrown by the updatemac crate.
pub enum UpdateError {
    /// Failed to start the {phase} worker pool.
    WorkerPool {
        phase: Phase,
        source: rayon::ThreadPoolBuildError,
    },
    /// A worker in the {phase} phase stopped without reporting a result.
    WorkerLost { phase: Phase },
    /// Unknown task '{name}', expected one of: {known}.
    UnknownTask { name: String, known: String },
    /// Failed to create log file '{path}'.
    LogFile {
        path: Utf8PathBuf,
        source: io::Error,
    },
    /// Failed to flush log file '{path}'.
    LogFlush {
        path: Utf8PathBuf,
        source: io::Error,
    },
    /// Failed to install the Ctrl-C handler.
    SignalHandler { source: ctrlc::Error },
}
