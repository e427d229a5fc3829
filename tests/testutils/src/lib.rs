//! Common functions that are used by other tests.
use assert_cmd::Command;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use color_eyre::eyre::ensure;
use color_eyre::Result;
pub use pretty_assertions;
use std::env;
use std::fs;
use std::io::ErrorKind;

pub mod ensure_utils;
pub mod fake_tools;

pub use fake_tools::FakeTools;

/// Returns a new command starting with /path/to/{binary} (add args as needed).
///
/// `HOME` is pointed at the test's temp dir so nothing escapes into the real home directory, and
/// the log file is written to `{temp_dir}/{binary_name}.log`.
pub fn crate_binary_cmd(binary_name: &str, temp_dir: &Utf8Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin(binary_name)?;
    // Set temp dir to be inside our test's temp dir.
    cmd.env("TMPDIR", temp_dir.join(format!("{binary_name}_temp_dir")));
    cmd.env("HOME", temp_dir);
    // Don't let the developer's environment change the log levels under test.
    cmd.env_remove("LOG_LEVEL");
    cmd.env_remove("FILE_LOG_LEVEL");
    cmd.env_remove("UPDATEMAC_LOGFILE");
    cmd.env_remove("UPDATEMAC_PROBE_HOST");
    // Show backtrace on exit, nightly only for now.
    // https://github.com/rust-lang/rust/issues/53487
    cmd.env("RUST_BACKTRACE", "1");
    cmd.args(
        [
            "--log-level=debug",
            "--logfile",
            log_file(binary_name, temp_dir).as_str(),
            "--color=never",
        ]
        .iter(),
    );
    Ok(cmd)
}

/// Path of the log file that [`crate_binary_cmd`] tells the binary to write.
pub fn log_file(binary_name: &str, temp_dir: &Utf8Path) -> Utf8PathBuf {
    temp_dir.join(format!("{binary_name}.log"))
}

/// Extensions to `assert_cmd` functions.
pub trait AssertCmdExt {
    /**
    `assert_cmd`'s assert functions truncate the stdout and stderr.
    This is painful in CI, so add a function to always print them in CI.
    Refs: <https://github.com/assert-rs/assert_cmd/issues/180>
    */
    #[must_use]
    fn eprint_stdout_stderr(self) -> Self;
}

impl AssertCmdExt for assert_cmd::assert::Assert {
    /**
    `assert_cmd`'s assert functions truncate the stdout and stderr.
    This is painful in CI, so add a function to always print them in CI.

    In general instead of `.success()?` and `.stderr()` we use `.try_success()?` and
    `.try_stderr()?`. This is mostly to remind the author to use this method before
    asserting.

    Refs: <https://github.com/assert-rs/assert_cmd/issues/180>
    */
    fn eprint_stdout_stderr(self) -> Self {
        let output = self.get_output();
        eprintln!(
            "COMMAND STDOUT:\n-------------------\n<<<<\n{stdout}\n>>>>\n\nCOMMAND \
             STDERR:\n-------------------\n<<<<\n{stderr}\n>>>>",
            stdout = String::from_utf8_lossy(&output.stdout),
            stderr = String::from_utf8_lossy(&output.stderr),
        );
        self
    }
}

/// Returns the path to a temporary directory for your test (OS tempdir + test
/// function path). Cleans the directory if it already exists.
///
/// ```rust
/// # fn test_requiring_tempdir() -> color_eyre::Result<()> {
/// let temp_dir = testutils::temp_dir("updatemac", testutils::function_path!())?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails if any of the underlying file system operations fail.
pub fn temp_dir(binary_name: &str, function_path: &str) -> Result<Utf8PathBuf> {
    let os_temp_dir = Utf8PathBuf::try_from(env::temp_dir())?.canonicalize_utf8()?;
    let mut temp_dir = os_temp_dir.clone();
    temp_dir.push(format!("{binary_name}_test_tempdirs"));
    temp_dir.push(function_path.replace("::", "/"));
    ensure!(temp_dir.starts_with(&os_temp_dir));
    let remove_dir_result = fs::remove_dir_all(&temp_dir);
    if matches!(&remove_dir_result, Err(e) if e.kind() != ErrorKind::NotFound) {
        remove_dir_result?;
    }
    ensure!(!temp_dir.exists());
    fs::create_dir_all(&temp_dir)?;
    Ok(temp_dir)
}

/// Expands to the current function path.
#[macro_export]
macro_rules! function_path {
    () => {{
        // Okay, this is ugly, I get it. However, this is the best we can get on a stable rust.
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name
            // The f() above gives us the trailing `f` in the path.
            .trim_end_matches("::f")
            // If we use test_log::test for tests, we get a trailing `test_impl` in the path.
            .trim_end_matches("::test_impl")
    }};
}

/**
Ensures that two expressions are equal to each other (using [`PartialEq`]).
Uses pretty_assertions to generate a pretty diff.
We want to use ensure to return a result to make sure that destructors run, which doesn't happen after a panic.

On error, this macro will print a diff derived from [`Debug`] representation of
each value.

This is a drop in replacement for [`core::assert_eq!`] except that it returns a result.
You can provide a custom error message if desired.

# Examples

```
# fn main() -> color_eyre::Result<()> {
use testutils::ensure_eq;

let a = 3;
let b = 1 + 2;
ensure_eq!(a, b);

ensure_eq!(a, b, "we are testing addition with {} and {}", a, b);

# Ok(())
# }
```
*/
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::ensure_eq!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)*) => ({
        $crate::ensure_eq!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    ::color_eyre::eyre::bail!("assertion failed: `(left == right)`{}{}\
                       \n\
                       \n{}\
                       \n",
                       $maybe_colon,
                       format_args!($($arg)*),
                       $crate::pretty_assertions::Comparison::new(left_val, right_val)
                    )
                }
            }
        }
    });
}
