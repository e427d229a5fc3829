//! Utilities for dealing with users.

use std::fmt::Debug;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use tracing::{debug, warn};

use crate::cancellation::{Cancellation, POLL_INTERVAL};

/// Asks the user a yes/no question.
pub trait Confirm: Debug + Send + Sync {
    /// Returns `true` only if the user explicitly said yes. Declines if the run is cancelled
    /// while waiting.
    fn confirm(&self, question: &str, cancellation: &Cancellation) -> bool;
}

/**
Prompt on stdout and read an answer from stdin, defaulting to no.

| Input                  | Answer |
| ---                    | ---    |
| `y`, `yes` (any case)  | yes    |
| anything else          | no     |
| end of input           | no     |
| Ctrl-C while waiting   | no     |

*/
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str, cancellation: &Cancellation) -> bool {
        print!("{question} [y/N]: ");
        if let Err(e) = io::stdout().flush() {
            debug!("Failed to flush prompt: {e}");
        }

        // Read on another thread so we can still notice Ctrl-C, the read itself isn't
        // interrupted by the signal.
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line).map(|bytes| (bytes, line));
            // The receiver is gone if the prompt was already cancelled.
            let _ = sender.send(read);
        });

        loop {
            if cancellation.is_cancelled() {
                println!();
                warn!("User input cancelled.");
                return false;
            }
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(Ok((0, _))) => {
                    println!();
                    warn!("User input cancelled.");
                    return false;
                }
                Ok(Ok((_, line))) => return is_yes(&line),
                Ok(Err(e)) => {
                    warn!("Failed to read user input: {e}");
                    return false;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}

/// Whether a line typed by the user means yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
