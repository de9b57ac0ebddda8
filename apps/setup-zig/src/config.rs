//! Runtime configuration.
//!
//! Every environment lookup the action performs happens here, once, so the
//! resolvers and cache tiers receive plain values.
//!
//! ## Directory Layout
//!
//! ```text
//! $RUNNER_TOOL_CACHE/               # Tier1, job-local tool cache
//!   zig/
//!     0.11.0/
//!       x64/                        # Unpacked toolchain
//!       x64.complete                # Marker written after a full copy
//! $SETUP_ZIG_CACHE_DIR/             # Tier2, host-local persistent cache
//!   zig-zig-linux-x86_64-0.11.0.tar
//! $RUNNER_TEMP/setup-zig/           # Download and extraction scratch space
//! ```
//!
//! When the runner variables are absent (local runs), everything lives under
//! the user cache directory in `setup-zig/`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use setup_zig_versions::Sources;

/// Job-local tool cache root set by the runner.
pub const RUNNER_TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

/// Scratch directory set by the runner.
pub const RUNNER_TEMP_ENV: &str = "RUNNER_TEMP";

/// Host-local persistent cache root.
pub const CACHE_DIR_ENV: &str = "SETUP_ZIG_CACHE_DIR";

/// Override for the canonical download index.
pub const INDEX_URL_ENV: &str = "SETUP_ZIG_INDEX_URL";

/// Override for the mach download index.
pub const MACH_INDEX_URL_ENV: &str = "SETUP_ZIG_MACH_INDEX_URL";

/// Override for the commit-pinned builds host.
pub const BUILDS_URL_ENV: &str = "SETUP_ZIG_BUILDS_URL";

/// Directory name used under the user cache directory.
const APP_DIR: &str = "setup-zig";

/// Paths and endpoints for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tier1 root.
    pub tool_cache_dir: PathBuf,
    /// Tier2 root.
    pub persistent_cache_dir: PathBuf,
    /// Scratch directory for downloads and extraction.
    pub temp_dir: PathBuf,
    /// Remote endpoints.
    pub sources: Sources,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a runner variable is missing and the user cache
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let tool_cache_dir = match env_path(RUNNER_TOOL_CACHE_ENV) {
            Some(dir) => dir,
            None => user_cache_root()?.join("tool-cache"),
        };
        let persistent_cache_dir = match env_path(CACHE_DIR_ENV) {
            Some(dir) => dir,
            None => user_cache_root()?.join("cache"),
        };
        let temp_dir = env_path(RUNNER_TEMP_ENV)
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        let defaults = Sources::default();
        let sources = Sources {
            builds_url: env_url(BUILDS_URL_ENV).unwrap_or(defaults.builds_url),
            index_url: env_url(INDEX_URL_ENV).unwrap_or(defaults.index_url),
            mach_index_url: env_url(MACH_INDEX_URL_ENV).unwrap_or(defaults.mach_index_url),
        };

        Ok(Self {
            tool_cache_dir,
            persistent_cache_dir,
            temp_dir,
            sources,
        })
    }

    /// Builds a configuration with every directory under `root`.
    ///
    /// Endpoints keep their public defaults.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            tool_cache_dir: root.join("tool-cache"),
            persistent_cache_dir: root.join("cache"),
            temp_dir: root.join("tmp"),
            sources: Sources::default(),
        }
    }
}

/// Reads a non-empty path from the environment.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Reads a non-empty URL from the environment.
fn env_url(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Returns `<user cache dir>/setup-zig`.
fn user_cache_root() -> Result<PathBuf> {
    Ok(dirs::cache_dir()
        .context("Cannot determine cache directory. Set RUNNER_TOOL_CACHE and SETUP_ZIG_CACHE_DIR.")?
        .join(APP_DIR))
}
