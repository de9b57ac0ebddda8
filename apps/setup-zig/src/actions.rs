//! GitHub Actions runner protocol.
//!
//! The runner passes inputs through `INPUT_<NAME>` environment variables and
//! reads results back from stdout workflow commands and from files named by
//! environment variables. Only the four operations the action needs are
//! implemented here.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Environment variable naming the file that extends `PATH` for later steps.
pub const GITHUB_PATH_ENV: &str = "GITHUB_PATH";

/// Returns the environment variable holding an input.
fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Reads an action input. Empty values count as unset.
#[must_use]
pub fn get_input(name: &str) -> Option<String> {
    std::env::var(input_env_name(name))
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Writes an informational line to the job log.
pub fn info(message: &str) {
    println!("{message}");
}

/// Marks the step as failed with `message`.
///
/// The caller is responsible for exiting with a non-zero status.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Escapes a workflow command payload.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Prepends `dir` to the `PATH` of every later step in the job.
///
/// Outside a runner there is no `GITHUB_PATH` file, so the export line is
/// printed instead.
///
/// # Errors
///
/// Returns an error if the `GITHUB_PATH` file cannot be written.
pub fn add_path(dir: &Path) -> Result<()> {
    match std::env::var_os(GITHUB_PATH_ENV) {
        Some(file) if !file.is_empty() => append_path_file(Path::new(&file), dir),
        _ => {
            #[cfg(unix)]
            info(&format!("export PATH=\"{}:$PATH\"", dir.display()));
            #[cfg(windows)]
            info(&format!("set PATH={};%PATH%", dir.display()));
            Ok(())
        }
    }
}

/// Appends one directory line to a runner path file.
fn append_path_file(file: &Path, dir: &Path) -> Result<()> {
    let mut handle = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    writeln!(handle, "{}", dir.display())
        .with_context(|| format!("Failed to write to {}", file.display()))?;
    Ok(())
}
