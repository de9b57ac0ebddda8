//! Build script for setup-zig.
//!
//! Embeds the commit the binary was built from as `SETUP_ZIG_GIT_COMMIT`.
//! Workflow builds take it from `GITHUB_SHA`; local builds ask git.

use std::process::Command;

/// Length of the abbreviated commit hash.
const SHORT_HASH_LEN: usize = 9;

fn main() {
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let commit = std::env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| !sha.trim().is_empty())
        .map(|sha| sha.trim().chars().take(SHORT_HASH_LEN).collect())
        .or_else(|| git(&["rev-parse", &format!("--short={SHORT_HASH_LEN}"), "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=SETUP_ZIG_GIT_COMMIT={commit}");

    if let Some(head) = git(&["rev-parse", "--path-format=absolute", "--git-path", "HEAD"]) {
        println!("cargo:rerun-if-changed={head}");
    }
}

/// Runs git and returns its trimmed stdout, if it succeeded with output.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
