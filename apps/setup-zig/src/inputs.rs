//! Action inputs and their validation.
//!
//! Validation runs before anything touches the network or the filesystem.

use semver::Version;
use setup_zig_versions::specifier::parse_version;

use crate::actions;
use crate::errors::SetupError;

/// Version installed when none is requested.
pub const DEFAULT_VERSION: &str = "master";

/// Cache flag used when none is given.
pub const DEFAULT_CACHE: &str = "true";

/// Oldest release the action can install.
const MINIMUM_VERSION: Version = Version::new(0, 3, 0);

/// Validated inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// Raw version specifier.
    pub version: String,
    /// Whether the host-local cache tier is used.
    pub use_cache: bool,
}

impl Inputs {
    /// Combines command line values with the runner inputs and validates them.
    ///
    /// Command line values win; runner inputs fill the gaps; defaults cover
    /// the rest.
    ///
    /// # Errors
    ///
    /// See [`Inputs::validate`].
    pub fn resolve(version: Option<String>, cache: Option<String>) -> Result<Self, SetupError> {
        let version = version
            .filter(|v| !v.trim().is_empty())
            .or_else(|| actions::get_input("version"))
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let cache = cache
            .filter(|c| !c.trim().is_empty())
            .or_else(|| actions::get_input("cache"))
            .unwrap_or_else(|| DEFAULT_CACHE.to_string());
        Self::validate(&version, &cache)
    }

    /// Validates raw input strings.
    ///
    /// # Errors
    ///
    /// - [`SetupError::UnsupportedVersion`] for a semantic version below 0.3.0
    /// - [`SetupError::InvalidCacheFlag`] unless the flag is `true` or `false`
    pub fn validate(version: &str, cache: &str) -> Result<Self, SetupError> {
        if let Some(parsed) = parse_version(version)
            && parsed < MINIMUM_VERSION
        {
            return Err(SetupError::unsupported_version(version));
        }

        let use_cache = match cache {
            "true" => true,
            "false" => false,
            other => return Err(SetupError::invalid_cache_flag(other)),
        };

        Ok(Self {
            version: version.to_string(),
            use_cache,
        })
    }
}
