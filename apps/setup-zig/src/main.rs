#![warn(clippy::pedantic)]

//! # setup-zig
//!
//! Installs a Zig toolchain on a CI runner and puts it on `PATH` for the
//! remaining steps of the job.
//!
//! ## Version Specifiers
//!
//! - `master` (default) - the latest nightly
//! - `0.11.0`, `~0.11` - a release, or the newest release matching a range
//! - `0.12.0-dev.1092+68ed78775` - an exact nightly, pinned by commit
//! - `mach-latest`, `2024.1.0-mach` - mach nominated versions
//!
//! ## Caching
//!
//! Toolchains are looked up in the job's tool cache, then in a cache that
//! persists on the host across jobs, and only then downloaded. A download
//! populates both caches; `--cache false` leaves the host cache alone.
//!
//! ## Examples
//!
//! As a workflow step the inputs arrive as `INPUT_VERSION` and `INPUT_CACHE`.
//! Run by hand:
//!
//! ```bash
//! setup-zig 0.13.0
//! setup-zig 0.12.0-dev.1092+68ed78775 --cache false
//! setup-zig master --arch arm64 --os darwin
//! ```

mod actions;
mod config;
mod errors;
mod inputs;
mod logging;
mod toolchain;

use anyhow::Result;
use clap::Parser;
use setup_zig_versions::Platform;
use tracing::debug;

use config::Config;
use inputs::Inputs;
use toolchain::Installer;

/// Commit the binary was built from.
const GIT_COMMIT: &str = env!("SETUP_ZIG_GIT_COMMIT");

/// Install and cache a Zig toolchain.
#[derive(Parser)]
#[command(
    name = "setup-zig",
    author,
    version,
    about = "Install and cache a Zig toolchain on a CI runner",
    after_help = "\
ENVIRONMENT VARIABLES:
    INPUT_VERSION              Version when none is given (default: master)
    INPUT_CACHE                Cache flag when none is given (default: true)
    RUNNER_TOOL_CACHE          Job-local tool cache directory
    RUNNER_TEMP                Scratch directory for downloads
    SETUP_ZIG_CACHE_DIR        Host-local persistent cache directory
    SETUP_ZIG_INDEX_URL        Download index (default: https://ziglang.org/download/index.json)
    SETUP_ZIG_MACH_INDEX_URL   Mach index (default: https://machengine.org/zig/index.json)
    SETUP_ZIG_BUILDS_URL       Host for pinned builds (default: https://ziglang.org/builds)
    GITHUB_PATH                File receiving the install directory
    SETUP_ZIG_LOG              Log filter (falls back to RUST_LOG)"
)]
struct Cli {
    /// Version, range, tag, or commit-pinned build to install.
    #[arg(value_name = "VERSION")]
    specifier: Option<String>,

    /// Whether to use the host-local cache ("true" or "false").
    #[arg(long)]
    cache: Option<String>,

    /// Architecture to install for (x64, arm, arm64, ppc64, riscv64).
    #[arg(long)]
    arch: Option<String>,

    /// Operating system to install for (linux, darwin, win32).
    #[arg(long)]
    os: Option<String>,
}

impl Cli {
    /// Returns the requested platform, detecting whatever was not given.
    fn platform(&self) -> Result<Platform> {
        if let (Some(arch), Some(os)) = (&self.arch, &self.os) {
            return Ok(Platform::parse(arch, os)?);
        }
        let detected = Platform::detect()?;
        let arch = self.arch.as_deref().unwrap_or(detected.arch.as_str());
        let os = self.os.as_deref().unwrap_or(detected.os.as_str());
        Ok(Platform::parse(arch, os)?)
    }
}

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(e) = run().await {
        std::process::exit(handle_error(&e));
    }
}

fn handle_error(e: &anyhow::Error) -> i32 {
    debug!("{e:?}");
    actions::set_failed(&format!("{e:#}"));
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    debug!(commit = GIT_COMMIT, "setup-zig {}", env!("CARGO_PKG_VERSION"));

    let inputs = Inputs::resolve(cli.specifier.clone(), cli.cache.clone())?;
    let platform = cli.platform()?;
    debug!(%platform, version = %inputs.version, use_cache = inputs.use_cache, "starting");

    let config = Config::from_env()?;
    let installer = Installer::new(&config)?;
    let zig_path = installer
        .install_toolchain(platform, &inputs.version, inputs.use_cache)
        .await?;

    actions::add_path(&zig_path)?;
    actions::info(&format!("zig installed at {}", zig_path.display()));
    Ok(())
}
