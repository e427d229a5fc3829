//! User cancellation (Ctrl-C) shared between the signal handler and the phases of a run.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::UpdateError;

/// How often wait loops wake up to look at the cancellation flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exit code used when the user insists on stopping immediately.
const FORCED_EXIT_CODE: i32 = 1;

/**
A cloneable flag recording that the user asked to stop.

Work is never interrupted directly: anything waiting on a worker or on user input checks
[`Cancellation::is_cancelled`] every [`POLL_INTERVAL`] and gives up once it is set.
*/
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel on Ctrl-C. A second Ctrl-C exits straight away.
    ///
    /// Can only be called once per process.
    pub fn install_ctrlc_handler(&self) -> Result<(), UpdateError> {
        let cancellation = self.clone();
        ctrlc::set_handler(move || {
            if cancellation.is_cancelled() {
                process::exit(FORCED_EXIT_CODE);
            }
            cancellation.cancel();
        })
        .map_err(|source| UpdateError::SignalHandler { source })
    }

    /// Request cancellation of everything sharing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
