//! Handle paths that are passed as CLI options.

use std::{convert::Infallible, fmt::Display, ops::Deref, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};

use crate::utils::files;

/// The path of the log file, with any leading `~` already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile(pub Utf8PathBuf);

impl FromStr for LogFile {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Utf8PathBuf::from(files::expand_tilde(s))))
    }
}

impl Display for LogFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<Utf8Path> for LogFile {
    fn as_ref(&self) -> &Utf8Path {
        &self.0
    }
}

impl Deref for LogFile {
    type Target = Utf8PathBuf;

    fn deref(&self) -> &Utf8PathBuf {
        &self.0
    }
}
