//! Error types for the setup-zig action.
//!
//! Resolution failures come from [`setup_zig_versions::VersionError`]. This
//! module covers what the action itself rejects or fails at. Everything is
//! carried through `anyhow::Result` and reported once, by `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the action outside of version resolution.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Requested Zig release predates what the action can install.
    #[error("This action does not work with Zig 0.1.0 and Zig 0.2.0")]
    UnsupportedVersion {
        /// The rejected specifier.
        version: String,
    },

    /// The `cache` input is neither `true` nor `false`.
    #[error("`with.cache` must be \"true\" or \"false\"")]
    InvalidCacheFlag {
        /// The rejected value.
        value: String,
    },

    /// Network error during archive download.
    #[error("download error: {message}")]
    DownloadError {
        /// Description of the download error.
        message: String,
    },

    /// The archive did not contain the expected top-level directory.
    #[error("extracted archive has no directory {}", path.display())]
    MissingArchiveRoot {
        /// The directory that was expected.
        path: PathBuf,
    },

    /// Every cache tier declined the request.
    #[error("no cache tier could provide {variant}")]
    TiersExhausted {
        /// Variant name of the artifact.
        variant: String,
    },
}

impl SetupError {
    /// Creates a new `UnsupportedVersion` error.
    #[must_use]
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// Creates a new `InvalidCacheFlag` error.
    #[must_use]
    pub fn invalid_cache_flag(value: impl Into<String>) -> Self {
        Self::InvalidCacheFlag {
            value: value.into(),
        }
    }

    /// Creates a new `DownloadError`.
    #[must_use]
    pub fn download_error(message: impl Into<String>) -> Self {
        Self::DownloadError {
            message: message.into(),
        }
    }
}
