//! The update sources we know about.

use color_eyre::Result;
use tracing::debug;

use super::task::{pending_if_stdout_non_empty, pending_unless_output_contains, UpdateTask};
use crate::errors::UpdateError;

/// Printed by `softwareupdate -l` when macOS is up to date.
pub const MACOS_UP_TO_DATE_MARKER: &str = "No new software available";
/// Printed by `brew update --auto-update` when Homebrew updated itself without finding anything
/// new.
pub const BREW_AUTO_UPDATED_MARKER: &str = "Auto-updated Homebrew";

/// Every update source, in the order they are listed.
pub fn default_tasks() -> Vec<UpdateTask> {
    vec![
        UpdateTask::new(
            "macos",
            "macOS",
            ["softwareupdate", "-l"],
            ["softwareupdate", "-ia"],
            pending_unless_output_contains(MACOS_UP_TO_DATE_MARKER),
        ),
        UpdateTask::new(
            "mas",
            "App Store (mas)",
            ["mas", "outdated"],
            ["mas", "upgrade"],
            pending_if_stdout_non_empty(),
        ),
        // This reports a pending update whenever the marker is missing, including when brew
        // changes its wording.
        UpdateTask::new(
            "brew",
            "Homebrew (brew update)",
            ["brew", "update", "--auto-update"],
            ["brew", "update"],
            pending_unless_output_contains(BREW_AUTO_UPDATED_MARKER),
        ),
        UpdateTask::new(
            "brew-packages",
            "Homebrew packages",
            ["brew", "outdated", "--verbose"],
            ["brew", "upgrade", "--greedy"],
            pending_if_stdout_non_empty(),
        ),
    ]
}

/**
Keep only the tasks matching `filter`, by id or name (case-insensitive). An empty filter keeps
everything.

```text
select(default_tasks(), &["mas".to_owned(), "Homebrew packages".to_owned()])
```
*/
pub fn select(tasks: Vec<UpdateTask>, filter: &[String]) -> Result<Vec<UpdateTask>> {
    if filter.is_empty() {
        return Ok(tasks);
    }

    let matches = |task: &UpdateTask, wanted: &str| {
        task.id().eq_ignore_ascii_case(wanted) || task.name().eq_ignore_ascii_case(wanted)
    };

    for wanted in filter {
        if !tasks.iter().any(|task| matches(task, wanted)) {
            return Err(UpdateError::UnknownTask {
                name: wanted.clone(),
                known: tasks
                    .iter()
                    .map(UpdateTask::id)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into());
        }
    }

    let selected: Vec<UpdateTask> = tasks
        .into_iter()
        .filter(|task| filter.iter().any(|wanted| matches(task, wanted)))
        .collect();
    debug!(
        "Selected tasks: {:?}",
        selected.iter().map(UpdateTask::id).collect::<Vec<_>>()
    );
    Ok(selected)
}
