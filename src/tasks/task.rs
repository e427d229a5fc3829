use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cancellation::Cancellation;
use crate::exec::{self, ExecutionResult};
use crate::utils::errors::truncate_output;

/// Decides from the check command's result whether an update is pending.
pub type PendingPredicate = Arc<dyn Fn(&ExecutionResult) -> bool + Send + Sync>;

/// One source of updates, e.g. the App Store.
#[derive(Clone)]
pub struct UpdateTask {
    id: String,
    name: String,
    check_command: Vec<String>,
    update_command: Vec<String>,
    pending_predicate: PendingPredicate,
    /// `None` until the first check.
    pending: Option<bool>,
}

impl UpdateTask {
    /// Create a task. `id` is the short name used on the command line (`--tasks mas`), `name` is
    /// what we call it in logs.
    pub fn new<C, U, S>(
        id: &str,
        name: &str,
        check_command: C,
        update_command: U,
        pending_predicate: PendingPredicate,
    ) -> Self
    where
        C: IntoIterator<Item = S>,
        U: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            check_command: check_command.into_iter().map(Into::into).collect(),
            update_command: update_command.into_iter().map(Into::into).collect(),
            pending_predicate,
            pending: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check_command(&self) -> &[String] {
        &self.check_command
    }

    pub fn update_command(&self) -> &[String] {
        &self.update_command
    }

    /// Result of the latest [`check`](Self::check), `None` if it has never been checked.
    pub const fn pending(&self) -> Option<bool> {
        self.pending
    }

    /// Whether the latest check found an update. False before the first check.
    pub fn is_pending(&self) -> bool {
        self.pending.unwrap_or(false)
    }

    /// Whether `result`, the output of the check command, means an update is pending.
    pub fn is_pending_for(&self, result: &ExecutionResult) -> bool {
        (self.pending_predicate)(result)
    }

    /// Run the check command and record whether an update is pending.
    pub fn check(&mut self) -> bool {
        info!("Checking for {} updates...", self.name);
        let result = exec::run(&self.check_command);
        let pending = self.is_pending_for(&result);
        self.pending = Some(pending);
        if pending {
            warn!("{} updates are pending", self.name);
        } else {
            info!("No {} updates available", self.name);
        }
        pending
    }

    /**
    Run the update command, returning whether it succeeded.

    Only meaningful after a check found a pending update. A run cancelled while the command was
    running counts as a failed update, it is never reported further.
    */
    pub fn update(&self, cancellation: &Cancellation) -> bool {
        info!("Updating {}...", self.name);
        let result = exec::run(&self.update_command);
        if cancellation.is_cancelled() {
            warn!("{} update cancelled by user.", self.name);
            return false;
        }
        if result.success() {
            info!("{} update completed successfully", self.name);
            true
        } else {
            error!(
                "{} update failed: {}",
                self.name,
                truncate_output(&result.stderr)
            );
            false
        }
    }
}

impl fmt::Debug for UpdateTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("check_command", &self.check_command)
            .field("update_command", &self.update_command)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Pending unless the check output (stdout or stderr) contains `marker`, e.g. a "nothing to do"
/// message.
pub fn pending_unless_output_contains(marker: &'static str) -> PendingPredicate {
    Arc::new(move |result: &ExecutionResult| {
        !(result.stdout.contains(marker) || result.stderr.contains(marker))
    })
}

/// Pending whenever the check command printed anything, e.g. a list of outdated packages.
pub fn pending_if_stdout_non_empty() -> PendingPredicate {
    Arc::new(|result: &ExecutionResult| !result.stdout.trim().is_empty())
}
