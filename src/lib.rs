//! Keep a Mac up to date: check macOS, the App Store and Homebrew for updates in parallel, then
//! apply them.

use color_eyre::eyre::Result;
use tracing::trace;

use crate::cancellation::Cancellation;
use crate::connectivity::ConnectivityProbe;
use crate::opts::{Opts, SubCommand};
use crate::tasks::{sources, Orchestrator, RunOutcome};
use crate::utils::log::LogContext;

pub mod cancellation;
pub mod connectivity;
pub mod errors;
pub mod exec;
pub mod opts;
pub mod tasks;
pub mod utils;

/**
Run `updatemac` with provided [Opts][] struct, logging through `log`.

# Errors

Errors if an unknown task was requested, or something went wrong with our own plumbing
(signal handler, worker pool). Failing updates are logged and reported in the [`RunOutcome`].

[Opts]: crate::opts::Opts
*/
pub fn run(opts: Opts, log: &LogContext) -> Result<RunOutcome> {
    trace!("Options: {opts:#?}");
    let tasks = sources::select(sources::default_tasks(), &opts.tasks)?;

    let cmd = opts.cmd.unwrap_or_default();
    if cmd == SubCommand::List {
        for task in &tasks {
            println!("{}\t{}", task.id(), task.name());
        }
        return Ok(RunOutcome::Listed);
    }

    let cancellation = Cancellation::new();
    cancellation.install_ctrlc_handler()?;

    let orchestrator = Orchestrator::new(tasks, ConnectivityProbe::ping(&opts.probe_host))
        .with_cancellation(cancellation)
        .with_dispatch(log.dispatch().clone())
        .with_log_file(log.path().to_owned())
        .non_interactive(opts.no_interaction);

    match cmd {
        SubCommand::Check => orchestrator.check_only(),
        SubCommand::Run | SubCommand::List => orchestrator.run(),
    }
}
