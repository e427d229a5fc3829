//! Utilities for dealing with files, including wrappers around `std::fs` APIs.

use camino::Utf8Path;
use color_eyre::eyre::eyre;
use color_eyre::eyre::Context;
use color_eyre::Result;
use std::fs;
use tracing::trace;

/// Get a parent path or provide a useful error message.
pub(crate) fn parent(path: &Utf8Path) -> Result<&Utf8Path> {
    path.parent()
        .ok_or_else(|| eyre!("Didn't expect path {path} to be the root directory."))
}

/// Same as `std::fs::create_dir_all()` but with a better error message.
pub fn create_dir_all(path: impl AsRef<Utf8Path>) -> Result<()> {
    let path = path.as_ref();
    trace!("Ensuring that directory path exists: {path}");
    fs::create_dir_all(path).wrap_err_with(|| eyre!("Failed to create directory {path}"))
}

/// Expand a leading `~` in a user-provided path to the current user's home directory.
/// Paths are left alone if the home directory can't be calculated.
pub fn expand_tilde(path: &str) -> String {
    shellexpand::tilde_with_context(path, || {
        dirs::home_dir().and_then(|home| home.to_str().map(str::to_owned))
    })
    .into_owned()
}
