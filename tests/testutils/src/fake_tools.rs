//! Stand-ins for the external tools the binary shells out to.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use color_eyre::eyre::Context;
use color_eyre::Result;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;

/// A directory of fake executables that record every invocation in a shared calls file.
#[derive(Debug, Clone)]
pub struct FakeTools {
    pub bin_dir: Utf8PathBuf,
    pub calls_file: Utf8PathBuf,
}

impl FakeTools {
    /// Create the `fake_bin` directory inside the test's temp dir.
    pub fn new(temp_dir: &Utf8Path) -> Result<Self> {
        let bin_dir = temp_dir.join("fake_bin");
        fs::create_dir_all(&bin_dir)?;
        Ok(Self {
            bin_dir,
            calls_file: temp_dir.join("calls.txt"),
        })
    }

    /**
    Write an executable `name` script. It appends `{name} {args}` to the calls file, then runs
    `body` (a `/bin/sh` snippet).

    ```text
    fake_tools.add("mas", r#"[ "$1" = outdated ] && echo "497799835 Xcode (15.0 -> 15.1)""#)?;
    ```
    */
    pub fn add(&self, name: &str, body: &str) -> Result<()> {
        let path = self.bin_dir.join(name);
        let script = format!(
            "#!/bin/sh\necho \"{name} $*\" >> '{calls}'\n{body}\n",
            calls = self.calls_file
        );
        fs::write(&path, script).wrap_err_with(|| format!("Failed to write fake tool {path}"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    /// A `PATH` value that finds the fake tools before anything on the system.
    pub fn path_env(&self) -> String {
        format!("{}:/usr/bin:/bin", self.bin_dir)
    }

    /// Every recorded invocation, e.g. `["ping -c 1 8.8.8.8", "mas outdated"]`.
    pub fn calls(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.calls_file) {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Recorded invocations of one tool.
    pub fn calls_to(&self, name: &str) -> Result<Vec<String>> {
        let prefix = format!("{name} ");
        Ok(self
            .calls()?
            .into_iter()
            .filter(|call| call.starts_with(&prefix))
            .collect())
    }
}
