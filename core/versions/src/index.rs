//! Resolution of loose specifiers through a download index.
//!
//! ## Index Format
//!
//! Both the canonical and the mach index are JSON objects keyed by version.
//! Each release maps `<arch>-<os>` host strings to a target record:
//!
//! ```json
//! {
//!   "master": {
//!     "version": "0.14.0-dev.1+abc",
//!     "date": "2024-06-01",
//!     "x86_64-linux": {
//!       "tarball": "https://ziglang.org/builds/zig-linux-x86_64-0.14.0-dev.1+abc.tar.xz",
//!       "size": "47000000"
//!     }
//!   },
//!   "0.7.0": { "...": "..." }
//! }
//! ```
//!
//! Keys are either semantic versions (`0.11.0`, `2024.1.0-mach`) or tags
//! (`master`, `mach-latest`). Fields that are not target records (`docs`,
//! `notes`, `src`, ...) are ignored, as are top-level entries that are not
//! releases. Entries are only interpreted once a specifier selects them.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::artifact::{Artifact, version_from_variant};
use crate::errors::{Result, VersionError};
use crate::platform::Platform;
use crate::sources::Sources;
use crate::specifier::{is_mach_calendar, max_satisfying, version_requirement};

/// Request timeout for index documents.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = "setup-zig";

/// Download record for one host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    /// Archive URL.
    pub tarball: String,
}

/// One version entry of the index, borrowed from its [`Index`].
#[derive(Debug, Clone, Copy)]
pub struct Release<'a> {
    entries: &'a serde_json::Map<String, Value>,
}

impl<'a> Release<'a> {
    /// Concrete version behind a tag such as `master`.
    #[must_use]
    pub fn version(&self) -> Option<&'a str> {
        self.entries.get("version").and_then(Value::as_str)
    }

    /// Publication date.
    #[must_use]
    pub fn date(&self) -> Option<&'a str> {
        self.entries.get("date").and_then(Value::as_str)
    }

    /// Returns the target record for an `<arch>-<os>` host string.
    #[must_use]
    pub fn target(&self, host: &str) -> Option<Target> {
        Target::deserialize(self.entries.get(host)?).ok()
    }
}

/// A parsed `index.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Index {
    releases: BTreeMap<String, Value>,
}

impl Index {
    /// Parses an index document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the document is not an index.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Returns the release under `key`, if that entry is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Release<'_>> {
        let entries = self.releases.get(key)?.as_object()?;
        Some(Release { entries })
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.releases.contains_key(key)
    }

    /// Iterates over every version key.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }

    /// Picks the index key a specifier refers to.
    ///
    /// Semver specifiers resolve to the highest matching semver key. Returns
    /// `None` when the specifier is not semver or nothing matches, in which
    /// case the raw specifier is the key.
    #[must_use]
    pub fn select_key(&self, specifier: &str) -> Option<&str> {
        let req = version_requirement(specifier)?;
        max_satisfying(self.keys(), &req)
    }
}

/// Strips `.zip` or the trailing `.tar.<anything>` from an archive file name.
#[must_use]
pub fn strip_archive_extension(file_name: &str) -> Option<&str> {
    if let Some(stem) = file_name.strip_suffix(".zip") {
        return Some(stem);
    }
    file_name.rfind(".tar.").map(|i| &file_name[..i])
}

/// Derives the artifact descriptor from an index tarball URL.
///
/// Mach dev builds carry `+<hash>` in their file name. The hash is kept in
/// the archive directory name but cut from the variant name. A mach calendar
/// specifier is reported verbatim as the version, every other specifier
/// reports the version embedded in the file name.
///
/// # Errors
///
/// Returns [`VersionError::MalformedTarballUrl`] if the URL does not end in a
/// recognizable `zig-<os>-<arch>-<version>` archive name.
pub fn artifact_from_tarball(platform: Platform, specifier: &str, url: &str) -> Result<Artifact> {
    let malformed = || VersionError::MalformedTarballUrl {
        url: url.to_string(),
    };

    let file_name = url.rsplit('/').next().unwrap_or(url);
    let file_without_file_type = strip_archive_extension(file_name).ok_or_else(malformed)?;

    let ext = format!(".{}", platform.archive_extension());
    let without_ext = file_name.replacen(&ext, "", 1);
    let variant_name = match without_ext.split_once('+') {
        Some((head, _)) => head.to_string(),
        None => without_ext,
    };

    let version = if is_mach_calendar(specifier) {
        specifier.to_string()
    } else {
        version_from_variant(&variant_name)
            .ok_or_else(malformed)?
            .to_string()
    };

    Ok(Artifact {
        download_url: url.to_string(),
        file_without_file_type: file_without_file_type.to_string(),
        variant_name,
        version,
    })
}

/// Resolves loose specifiers by fetching index documents.
#[derive(Debug, Clone)]
pub struct IndexResolver {
    client: reqwest::Client,
    sources: Sources,
}

impl IndexResolver {
    /// Creates a resolver with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(sources: Sources) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| VersionError::HttpClient { source })?;
        Ok(Self::with_client(client, sources))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, sources: Sources) -> Self {
        Self { client, sources }
    }

    #[must_use]
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Downloads and parses one index document.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a body
    /// that is not an index.
    pub async fn fetch_index(&self, url: &str) -> Result<Index> {
        debug!(%url, "fetching zig index");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| VersionError::IndexFetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(VersionError::IndexStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| VersionError::IndexFetch {
                url: url.to_string(),
                source,
            })?;

        Index::from_json(&text).map_err(|source| VersionError::IndexParse {
            url: url.to_string(),
            source,
        })
    }

    /// Resolves a specifier without a `+` to a concrete artifact.
    ///
    /// Specifiers mentioning `mach` are looked up in the mach index first and
    /// fall back to the canonical index for keys the mach index lacks.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::VersionNotFound`] if neither index has the
    /// version for this platform, or any fetch error.
    pub async fn resolve_version(&self, platform: Platform, specifier: &str) -> Result<Artifact> {
        let mach = specifier.contains("mach");
        let primary = self.fetch_index(self.sources.index_for(mach)).await?;

        let key = primary.select_key(specifier).unwrap_or(specifier).to_string();
        debug!(%specifier, %key, "selected index key");

        let fallback = if mach && !primary.contains_key(&key) {
            Some(self.fetch_index(&self.sources.index_url).await?)
        } else {
            None
        };

        let host = platform.index_host();
        let target = primary
            .get(&key)
            .or_else(|| fallback.as_ref().and_then(|index| index.get(&key)))
            .and_then(|release| release.target(&host))
            .ok_or_else(|| VersionError::version_not_found(&key, &host))?;

        artifact_from_tarball(platform, specifier, &target.tarball)
    }
}
