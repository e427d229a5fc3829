use camino::Utf8Path;
use color_eyre::eyre::ensure;
use color_eyre::Result;
use std::fs;

/// Fail if there is a file, directory, or link at the path.
pub fn nothing_at(path: &Utf8Path) -> Result<()> {
    ensure!(!path.exists(), "Path '{path}' shouldn't exist.");
    Ok(())
}

/// Read a file that is expected to exist, with a useful error if it doesn't.
pub fn read_file(path: &Utf8Path) -> Result<String> {
    ensure!(
        path.is_file(),
        "Expected path to be a file, but it doesn't exist or has the wrong type.\n  Path: {path}"
    );
    Ok(fs::read_to_string(path)?)
}

/// Fail if the text does not contain every expected pattern.
pub fn contains_all(text: &str, patterns: &[&str]) -> Result<()> {
    for pattern in patterns {
        contains(text, pattern)?;
    }
    Ok(())
}

/// Fail if the text does not contain the expected pattern.
pub fn contains(text: &str, pattern: &str) -> Result<()> {
    ensure!(
        text.contains(pattern),
        "\n  Expected text to contain pattern.\n  Pattern: {pattern:?}\n  Text: <<<{text}>>>",
    );
    Ok(())
}

/// Fail if the text contains the pattern.
pub fn not_contains(text: &str, pattern: &str) -> Result<()> {
    ensure!(
        !text.contains(pattern),
        "\n  Expected text not to contain pattern.\n  Pattern: {pattern:?}\n  Text: <<<{text}>>>",
    );
    Ok(())
}
