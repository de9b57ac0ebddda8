//! Version specifier parsing.
//!
//! A specifier is whatever the user asked for. It takes one of two shapes,
//! decided once here so that callers can `match` instead of re-checking the
//! string:
//!
//! - **Pinned**: `<version>+<commit>`, e.g. `0.12.0-dev.1092+68ed78775`.
//!   Resolved offline against the builds host.
//! - **Loose**: a semver version or range, `master`, `mach-latest`, or a mach
//!   calendar version like `2024.1.0-mach`. Resolved through an index.

use std::fmt;

use semver::{BuildMetadata, Comparator, Op, Version, VersionReq};

/// A user-supplied version specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    /// Exact build pinned to a commit hash.
    Pinned(String),
    /// Anything that has to be looked up in an index.
    Loose(String),
}

impl VersionSpecifier {
    /// Classifies a raw specifier. The string is kept verbatim.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.contains('+') {
            Self::Pinned(raw.to_string())
        } else {
            Self::Loose(raw.to_string())
        }
    }

    /// Returns the raw specifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pinned(s) | Self::Loose(s) => s,
        }
    }

    /// Whether the specifier targets the mach index.
    #[must_use]
    pub fn is_mach(&self) -> bool {
        self.as_str().contains("mach")
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `raw` is a mach calendar version such as `2024.1.0-mach`.
#[must_use]
pub fn is_mach_calendar(raw: &str) -> bool {
    raw.ends_with("-mach") && Version::parse(raw).is_ok()
}

/// Parses a semantic version the way loose tooling does: surrounding
/// whitespace and a leading `=` or `v` are ignored.
#[must_use]
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('=').trim_start_matches('v');
    Version::parse(trimmed).ok()
}

/// Normalizes a version string by dropping its build metadata.
///
/// `0.12.0-dev.1092+68ed78775` becomes `0.12.0-dev.1092`. Returns `None` when
/// the input is not a semantic version.
#[must_use]
pub fn clean_version(raw: &str) -> Option<String> {
    let mut version = parse_version(raw)?;
    version.build = BuildMetadata::EMPTY;
    Some(version.to_string())
}

/// Builds the requirement a specifier expresses, if it is semver at all.
///
/// A plain version means exactly that version. Anything else that parses as a
/// semver range is used as a range. Non-semver specifiers (`master`,
/// `mach-latest`) yield `None`.
#[must_use]
pub fn version_requirement(raw: &str) -> Option<VersionReq> {
    if let Some(version) = parse_version(raw) {
        return Some(VersionReq {
            comparators: vec![Comparator {
                op: Op::Exact,
                major: version.major,
                minor: Some(version.minor),
                patch: Some(version.patch),
                pre: version.pre,
            }],
        });
    }
    VersionReq::parse(raw.trim()).ok()
}

/// Returns the highest key that satisfies `req`, ignoring keys that are not
/// semantic versions.
#[must_use]
pub fn max_satisfying<'a, I>(keys: I, req: &VersionReq) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter_map(|key| Version::parse(key).ok().map(|v| (v, key)))
        .filter(|(v, _)| req.matches(v))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, key)| key)
}
