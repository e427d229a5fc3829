//! Check we can reach the internet before asking any tool for updates.

use std::ffi::OsString;

use tracing::{debug, Level};

use crate::exec::cmd_log;
use crate::utils::errors::log_error;

/// Host pinged by default, Google's public DNS.
pub const DEFAULT_PROBE_HOST: &str = "8.8.8.8";

/// A command that exits 0 only when the network is reachable.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    command: Vec<String>,
}

impl ConnectivityProbe {
    /// Send a single ping to `host`.
    pub fn ping(host: &str) -> Self {
        Self::new(["ping", "-c", "1", host])
    }

    /// Probe with an arbitrary command, e.g. `["true"]` in tests.
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Run the probe, with its output discarded. Any failure to run it counts as offline.
    pub fn is_online(&self) -> bool {
        let Some((program, args)) = self.command.split_first() else {
            return false;
        };
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();
        match cmd_log(Level::DEBUG, program.as_str(), &args)
            .stdout_null()
            .stderr_null()
            .unchecked()
            .run()
        {
            Ok(output) => {
                debug!("Connectivity probe exited with: {}", output.status);
                output.status.success()
            }
            Err(e) => {
                debug!("Connectivity probe failed to run.{}", log_error(&e));
                false
            }
        }
    }
}

impl Default for ConnectivityProbe {
    fn default() -> Self {
        Self::ping(DEFAULT_PROBE_HOST)
    }
}
