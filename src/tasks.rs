//! Check every update source for pending updates, then apply them, in parallel.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::mem;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use color_eyre::Result;
use tracing::{debug, error, info, trace, warn, Dispatch};

use self::task::UpdateTask;
use crate::cancellation::{Cancellation, POLL_INTERVAL};
use crate::connectivity::ConnectivityProbe;
use crate::errors::UpdateError;
use crate::utils::log::{SUCCESS, SUMMARY};
use crate::utils::user::{Confirm, StdinConfirm};

pub mod sources;
pub mod task;

/// Checks or updates that take longer than this get a warning.
const SLOW_TASK: Duration = Duration::from_secs(60);

/// The stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Making sure we're online.
    Connectivity,
    /// Asking every task whether it has an update.
    Check,
    /// Updating the tasks that had one.
    Update,
}

impl Phase {
    const fn slug(self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Check => "check",
            Self::Update => "update",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Connectivity => write!(f, "connectivity check"),
            Self::Check => write!(f, "update check"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// What each phase found, keyed by task name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Whether each checked task had a pending update.
    pub checks: BTreeMap<String, bool>,
    /// Whether each update succeeded.
    pub updates: BTreeMap<String, bool>,
}

impl RunReport {
    /// Tasks whose check found a pending update.
    pub fn pending(&self) -> Vec<&str> {
        Self::names_where(&self.checks, true)
    }

    pub fn succeeded(&self) -> Vec<&str> {
        Self::names_where(&self.updates, true)
    }

    pub fn failed(&self) -> Vec<&str> {
        Self::names_where(&self.updates, false)
    }

    fn names_where(results: &BTreeMap<String, bool>, wanted: bool) -> Vec<&str> {
        results
            .iter()
            .filter(|(_, &result)| result == wanted)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Only listed the tasks.
    Listed,
    /// The connectivity probe failed, nothing was checked.
    Offline,
    /// The user cancelled during this phase.
    Cancelled(Phase),
    /// Nothing to update.
    UpToDate(RunReport),
    /// Checked without updating.
    Checked(RunReport),
    /// Updates were pending but the user said no.
    Declined(RunReport),
    /// Ran the updates. Some of them may have failed.
    Updated(RunReport),
}

impl RunOutcome {
    /// Process exit code. Failed updates are reported, not escalated.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Offline | Self::Cancelled(_) => 1,
            Self::Listed
            | Self::UpToDate(_)
            | Self::Checked(_)
            | Self::Declined(_)
            | Self::Updated(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    CheckOnly,
    Update,
}

/**
Runs the update tasks.

1. Ping to check we're online.
2. Run every task's check command in parallel.
3. Ask the user whether to continue (unless non-interactive).
4. Run the update command of every pending task in parallel.

Each phase gets a worker pool with one thread per task, and waits for every task before the next
phase starts. Ctrl-C (see [`Cancellation`]) while waiting abandons the run.
*/
#[derive(Debug)]
pub struct Orchestrator {
    tasks: Vec<UpdateTask>,
    probe: ConnectivityProbe,
    confirm: Box<dyn Confirm>,
    cancellation: Cancellation,
    dispatch: Dispatch,
    non_interactive: bool,
    log_file: Option<Utf8PathBuf>,
}

impl Orchestrator {
    /// Prompts on stdin, and logs to the calling thread's current dispatcher, unless
    /// configured otherwise.
    pub fn new(tasks: Vec<UpdateTask>, probe: ConnectivityProbe) -> Self {
        Self {
            tasks,
            probe,
            confirm: Box::new(StdinConfirm),
            cancellation: Cancellation::new(),
            dispatch: tracing::dispatcher::get_default(Dispatch::clone),
            non_interactive: false,
            log_file: None,
        }
    }

    #[must_use]
    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Dispatcher for the run, on the calling thread and on every worker thread.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Skip the confirmation prompt.
    #[must_use]
    pub const fn non_interactive(mut self, non_interactive: bool) -> Self {
        self.non_interactive = non_interactive;
        self
    }

    /// Log file to point the user to at the end.
    #[must_use]
    pub fn with_log_file(mut self, log_file: Utf8PathBuf) -> Self {
        self.log_file = Some(log_file);
        self
    }

    /// Check every task, then update the pending ones.
    pub fn run(self) -> Result<RunOutcome> {
        let dispatch = self.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || self.execute(Mode::Update))
    }

    /// Check every task and report which have pending updates, without updating.
    pub fn check_only(self) -> Result<RunOutcome> {
        let dispatch = self.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || self.execute(Mode::CheckOnly))
    }

    fn execute(mut self, mode: Mode) -> Result<RunOutcome> {
        let tasks = mem::take(&mut self.tasks);
        debug!("Task count: {}", tasks.len());
        trace!("Task list: {tasks:#?}");

        let online = self.probe.is_online();
        if self.cancellation.is_cancelled() {
            warn!("Operation cancelled by user (Ctrl+C). Exiting gracefully.");
            return Ok(RunOutcome::Cancelled(Phase::Connectivity));
        }
        if !online {
            error!("No internet connection. Aborting.");
            return Ok(RunOutcome::Offline);
        }
        info!(highlight = SUCCESS, "Internet connection detected.");

        keep_awake();

        let mut report = RunReport::default();

        let Some(checked) = self.run_phase(Phase::Check, tasks, |task, _| task.check())? else {
            warn!("Update check cancelled by user.");
            return Ok(RunOutcome::Cancelled(Phase::Check));
        };
        let mut pending_tasks = Vec::new();
        for (task, pending) in checked {
            report.checks.insert(task.name().to_owned(), pending);
            if pending {
                pending_tasks.push(task);
            }
        }

        // A Ctrl-C that landed after the last check still cancels the run.
        if self.cancellation.is_cancelled() {
            warn!("Update check cancelled by user.");
            return Ok(RunOutcome::Cancelled(Phase::Check));
        }

        if pending_tasks.is_empty() {
            info!(highlight = SUCCESS, "All systems are up to date. Exiting.");
            return Ok(RunOutcome::UpToDate(report));
        }

        if mode == Mode::CheckOnly {
            info!(
                highlight = SUMMARY,
                "Updates pending for: {}",
                report.pending().join(", ")
            );
            return Ok(RunOutcome::Checked(report));
        }

        if self.non_interactive {
            debug!("Not asking for confirmation as running non-interactively.");
        } else if !self
            .confirm
            .confirm("Proceed with updates?", &self.cancellation)
        {
            warn!("Updates aborted by user.");
            return Ok(RunOutcome::Declined(report));
        }

        let Some(updated) = self.run_phase(Phase::Update, pending_tasks, |task, cancellation| {
            task.update(cancellation)
        })?
        else {
            warn!("Update process cancelled by user.");
            return Ok(RunOutcome::Cancelled(Phase::Update));
        };
        for (task, success) in updated {
            if !success {
                error!("{} update encountered errors.", task.name());
            }
            report.updates.insert(task.name().to_owned(), success);
        }

        info!(
            "Ran {} updates, {} passed, {} failed",
            report.updates.len(),
            report.succeeded().len(),
            report.failed().len()
        );
        match &self.log_file {
            Some(log_file) => info!(
                highlight = SUMMARY,
                "Update process completed. See log at {log_file}"
            ),
            None => info!(highlight = SUMMARY, "Update process completed."),
        }
        Ok(RunOutcome::Updated(report))
    }

    /**
    Run `work` on every task, one worker thread per task, and wait for all of them.

    Returns `None` if the run was cancelled first. Workers still running are abandoned, they are
    never joined.
    */
    fn run_phase<F>(
        &self,
        phase: Phase,
        tasks: Vec<UpdateTask>,
        work: F,
    ) -> Result<Option<Vec<(UpdateTask, bool)>>, UpdateError>
    where
        F: Fn(&mut UpdateTask, &Cancellation) -> bool + Copy + Send + 'static,
    {
        if self.cancellation.is_cancelled() {
            return Ok(None);
        }
        let task_count = tasks.len();
        if task_count == 0 {
            return Ok(Some(Vec::new()));
        }

        debug!("Starting {phase} phase with {task_count} workers.");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(task_count)
            .thread_name(move |index| format!("updatemac-{}-{index}", phase.slug()))
            // A panicking worker shows up below as a disconnected channel.
            .panic_handler(|_| {})
            .build()
            .map_err(|source| UpdateError::WorkerPool { phase, source })?;

        let (sender, receiver) = mpsc::channel();
        for mut task in tasks {
            let sender = sender.clone();
            let dispatch = self.dispatch.clone();
            let cancellation = self.cancellation.clone();
            pool.spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    let now = Instant::now();
                    let result = work(&mut task, &cancellation);
                    let elapsed_time = now.elapsed();
                    if elapsed_time > SLOW_TASK {
                        warn!("Task '{}' {phase} took {elapsed_time:?}", task.name());
                    } else {
                        debug!("Task '{}' {phase} took {elapsed_time:?}", task.name());
                    }
                    // The receiver is gone if the phase was cancelled.
                    let _ = sender.send((task, result));
                });
            });
        }
        drop(sender);

        let mut finished = Vec::with_capacity(task_count);
        while finished.len() < task_count {
            if self.cancellation.is_cancelled() {
                return Ok(None);
            }
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(result) => finished.push(result),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(UpdateError::WorkerLost { phase });
                }
            }
        }
        if self.cancellation.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(finished))
    }
}

/// If in macOS, don't let the display sleep until the command exits.
#[cfg(target_os = "macos")]
fn keep_awake() {
    let pid = std::process::id().to_string();
    if let Err(e) = crate::cmd_debug!("caffeinate", "-ds", "-w", pid)
        .stdout_null()
        .stderr_null()
        .start()
    {
        debug!("Failed to start caffeinate: {e}");
    }
}

#[cfg(not(target_os = "macos"))]
const fn keep_awake() {}
