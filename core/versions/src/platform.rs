//! Host platform mapping.
//!
//! Hosts are identified the way CI runners report them (`x64`, `arm64`,
//! `linux`, `win32`, ...). Zig publishes its builds under its own naming
//! scheme, so every identifier is translated before it is used in a URL,
//! an index lookup or a cache key.
//!
//! ## Supported Identifiers
//!
//! | Host arch | Vendor arch |   | Host OS  | Vendor OS | Archive  |
//! |-----------|-------------|---|----------|-----------|----------|
//! | `x64`     | `x86_64`    |   | `linux`  | `linux`   | `tar.xz` |
//! | `arm`     | `armv7a`    |   | `darwin` | `macos`   | `tar.xz` |
//! | `arm64`   | `aarch64`   |   | `win32`  | `windows` | `zip`    |
//! | `ppc64`   | `powerpc64` |   |          |           |          |
//! | `riscv64` | `riscv64`   |   |          |           |          |
//!
//! Anything outside these tables is an error. There is no fallback.

use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, VersionError};

/// Host CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostArch {
    X64,
    Arm,
    Arm64,
    Ppc64,
    Riscv64,
}

impl HostArch {
    /// Returns the runner identifier (`x64`, `arm64`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Ppc64 => "ppc64",
            Self::Riscv64 => "riscv64",
        }
    }

    /// Returns the architecture name used in Zig artifact names.
    #[must_use]
    pub fn vendor_name(self) -> &'static str {
        match self {
            Self::X64 => "x86_64",
            Self::Arm => "armv7a",
            Self::Arm64 => "aarch64",
            Self::Ppc64 => "powerpc64",
            Self::Riscv64 => "riscv64",
        }
    }

    /// Maps the compile-time target architecture to a runner identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the build target is not a supported architecture.
    pub fn detect() -> Result<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Ok(Self::X64),
            "arm" => Ok(Self::Arm),
            "aarch64" => Ok(Self::Arm64),
            "powerpc64" => Ok(Self::Ppc64),
            "riscv64" => Ok(Self::Riscv64),
            other => Err(VersionError::UnsupportedArchitecture {
                arch: other.to_string(),
            }),
        }
    }
}

impl FromStr for HostArch {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x64" => Ok(Self::X64),
            "arm" => Ok(Self::Arm),
            "arm64" => Ok(Self::Arm64),
            "ppc64" => Ok(Self::Ppc64),
            "riscv64" => Ok(Self::Riscv64),
            other => Err(VersionError::UnsupportedArchitecture {
                arch: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    Linux,
    Darwin,
    Win32,
}

impl HostOs {
    /// Returns the runner identifier (`linux`, `darwin`, `win32`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
        }
    }

    /// Returns the OS name used in Zig artifact names.
    #[must_use]
    pub fn vendor_name(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "macos",
            Self::Win32 => "windows",
        }
    }

    /// Returns the archive extension Zig publishes for this OS.
    #[must_use]
    pub fn archive_extension(self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "tar.xz",
            Self::Win32 => "zip",
        }
    }

    /// Maps the compile-time target OS to a runner identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the build target is not a supported OS.
    pub fn detect() -> Result<Self> {
        match std::env::consts::OS {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Win32),
            other => Err(VersionError::UnsupportedOperatingSystem {
                os: other.to_string(),
            }),
        }
    }
}

impl FromStr for HostOs {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linux" => Ok(Self::Linux),
            "darwin" => Ok(Self::Darwin),
            "win32" => Ok(Self::Win32),
            other => Err(VersionError::UnsupportedOperatingSystem {
                os: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An (architecture, operating system) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub arch: HostArch,
    pub os: HostOs,
}

impl Platform {
    #[must_use]
    pub fn new(arch: HostArch, os: HostOs) -> Self {
        Self { arch, os }
    }

    /// Parses a pair of runner identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if either identifier is outside the supported set.
    pub fn parse(arch: &str, os: &str) -> Result<Self> {
        Ok(Self {
            arch: arch.parse()?,
            os: os.parse()?,
        })
    }

    /// Detects the platform this binary was built for.
    ///
    /// # Errors
    ///
    /// Returns an error if the build target is not supported.
    pub fn detect() -> Result<Self> {
        Ok(Self {
            arch: HostArch::detect()?,
            os: HostOs::detect()?,
        })
    }

    /// Returns the `<vendorArch>-<vendorOs>` key used by the download index.
    #[must_use]
    pub fn index_host(self) -> String {
        format!("{}-{}", self.arch.vendor_name(), self.os.vendor_name())
    }

    /// Returns the `zig-<vendorOs>-<vendorArch>` artifact name prefix.
    #[must_use]
    pub fn artifact_prefix(self) -> String {
        format!("zig-{}-{}", self.os.vendor_name(), self.arch.vendor_name())
    }

    /// Returns the archive extension for this platform.
    #[must_use]
    pub fn archive_extension(self) -> &'static str {
        self.os.archive_extension()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Maps a runner architecture identifier to Zig's name for it.
///
/// # Errors
///
/// Returns an error for identifiers outside the supported set.
pub fn map_arch(arch: &str) -> Result<&'static str> {
    arch.parse::<HostArch>().map(HostArch::vendor_name)
}

/// Maps a runner OS identifier to Zig's name for it.
///
/// # Errors
///
/// Returns an error for identifiers outside the supported set.
pub fn map_os(os: &str) -> Result<&'static str> {
    os.parse::<HostOs>().map(HostOs::vendor_name)
}

/// Returns the archive extension (`zip` or `tar.xz`) for a runner OS identifier.
///
/// # Errors
///
/// Returns an error for identifiers outside the supported set.
pub fn extension_for(os: &str) -> Result<&'static str> {
    os.parse::<HostOs>().map(HostOs::archive_extension)
}
