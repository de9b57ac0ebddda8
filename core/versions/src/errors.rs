//! Error types for version resolution.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VersionError>;

/// Errors that can occur while turning a version specifier into an artifact.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Host architecture identifier outside the supported set.
    #[error("unsupported architecture: {arch}")]
    UnsupportedArchitecture {
        /// The identifier that failed to map.
        arch: String,
    },

    /// Host operating system identifier outside the supported set.
    #[error("unsupported operating system: {os}")]
    UnsupportedOperatingSystem {
        /// The identifier that failed to map.
        os: String,
    },

    /// The version part of a commit-pinned specifier is not a semantic version.
    #[error("invalid pinned version: {specifier}")]
    InvalidPinnedVersion {
        /// The raw specifier.
        specifier: String,
    },

    /// The index has no entry for the resolved version on this host.
    #[error("Could not find version {version} for platform {host}")]
    VersionNotFound {
        /// The resolved index key.
        version: String,
        /// The `<arch>-<os>` host string.
        host: String,
    },

    /// The tarball URL in the index does not name a `.zip` or `.tar.*` archive.
    #[error("unrecognized archive in tarball url: {url}")]
    MalformedTarballUrl {
        /// The offending URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client")]
    HttpClient {
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// Transport failure while fetching an index document.
    #[error("failed to fetch index from {url}")]
    IndexFetch {
        /// The index URL.
        url: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The index server answered with a non-success status.
    #[error("HTTP error {status}: {url}")]
    IndexStatus {
        /// The index URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The index document is not the expected JSON shape.
    #[error("failed to parse index from {url}")]
    IndexParse {
        /// The index URL.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl VersionError {
    /// Creates a new `VersionNotFound` error.
    #[must_use]
    pub fn version_not_found(version: impl Into<String>, host: impl Into<String>) -> Self {
        Self::VersionNotFound {
            version: version.into(),
            host: host.into(),
        }
    }
}
