//! Wrappers around executing commands.

use crate::log;
use crate::utils::errors::log_error;
use duct::Expression;
use std::ffi::OsString;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::Output;
use tracing::{debug, error, Level};

/// Exit status reported for commands that couldn't be run at all.
pub const FAILED_TO_RUN_STATUS: i32 = 1;

/// What happened when we ran a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The program and arguments that were run.
    pub command: Vec<String>,
    /// Exit code, `128 + signal` if the command was killed by a signal.
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// Whether the command exited with status 0.
    pub const fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Result for a command that couldn't be started.
    fn failed_to_run(command: &[String], reason: String) -> Self {
        Self {
            command: command.to_vec(),
            exit_status: FAILED_TO_RUN_STATUS,
            stdout: String::new(),
            stderr: reason,
        }
    }

    fn from_output(command: &[String], output: &Output) -> Self {
        let exit_status = output
            .status
            .code()
            .or_else(|| output.status.signal().map(|signal| 128 + signal))
            .unwrap_or(FAILED_TO_RUN_STATUS);
        Self {
            command: command.to_vec(),
            exit_status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/**
Run a command to completion, capturing its output.

This never fails: if the command can't be run at all (empty command, missing binary, permission
denied) the error is logged and returned as a result with exit status
[`FAILED_TO_RUN_STATUS`] and the error message in `stderr`.

There is no timeout, a command that hangs blocks the caller.
*/
pub fn run(command: &[String]) -> ExecutionResult {
    let Some((program, args)) = command.split_first() else {
        error!("Refusing to run an empty command.");
        return ExecutionResult::failed_to_run(command, "Command was empty.".to_owned());
    };

    let output: io::Result<Output> = cmd_log(Level::DEBUG, program.as_str(), args)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run();

    match output {
        Ok(output) => {
            let result = ExecutionResult::from_output(command, &output);
            debug!(
                "Command {command:?} exited with status {status}.",
                status = result.exit_status
            );
            debug!("{command:?} stdout: {}", result.stdout.trim());
            debug!("{command:?} stderr: {}", result.stderr.trim());
            result
        }
        Err(e) => {
            error!(
                "Error running command {command}.{}",
                log_error(&e),
                command = command.join(" ")
            );
            ExecutionResult::failed_to_run(command, e.to_string())
        }
    }
}

/// Wrapper around `duct::cmd` function that lets us log the command we're running.
pub fn cmd_log<T, U>(l: Level, program: T, args: U) -> Expression
where
    T: duct::IntoExecutablePath + Clone,
    U: IntoIterator + Clone,
    U::Item: Into<OsString>,
{
    let formatted_cmd = std::iter::once(program.clone().to_executable())
        .chain(args.clone().into_iter().map(Into::into))
        .map(|arg| shell_escape::escape(arg.to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    log!(l, "Running command: {formatted_cmd}");

    duct::cmd(program, args)
}

/// Copy of the `duct::cmd!` macro that ensures we're logging the command we're running at the debug
/// level (not logged to the console by default).
#[macro_export]
macro_rules! cmd_debug {
    ( $program:expr $(, $arg:expr )* $(,)? ) => {
        {
            use std::ffi::OsString;
            let args: &[OsString] = &[$( Into::<OsString>::into($arg) ),*];
            $crate::exec::cmd_log(tracing::Level::DEBUG, $program, args)
        }
    };
}
