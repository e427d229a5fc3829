//! Utilities for manipulating eyre errors and command output for log messages.

use std::fmt::Debug;

/// Longest command output we put into a single log line.
const MAX_LOGGED_OUTPUT: usize = 1000;

/// Format an error into a nice way to show it in a log message.
/// e.g.
///
/// ```text
/// error!("Action failed.{}", log_error(&e));
/// ```
pub fn log_error(e: &impl Debug) -> String {
    format!("\n  Error: {e:?}")
}

/// Trim captured command output and keep only its tail, which is where tools put the reason
/// they failed.
pub fn truncate_output(output: &str) -> String {
    let output = output.trim();
    let char_count = output.chars().count();
    if char_count <= MAX_LOGGED_OUTPUT {
        return output.to_owned();
    }
    let tail: String = output.chars().skip(char_count - MAX_LOGGED_OUTPUT).collect();
    format!("...{tail}")
}
