//! Remote endpoints used for resolution.

/// Default host for commit-pinned builds.
pub const DEFAULT_BUILDS_URL: &str = "https://ziglang.org/builds";

/// Default canonical download index.
pub const DEFAULT_INDEX_URL: &str = "https://ziglang.org/download/index.json";

/// Default mach-project download index.
///
/// Advertised as a superset of the canonical index, but it lags behind it, so
/// `master` there can be an old build.
pub const DEFAULT_MACH_INDEX_URL: &str = "https://machengine.org/zig/index.json";

/// The three places resolution may look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    /// Base URL that commit-pinned archive names are appended to.
    pub builds_url: String,
    /// Canonical `index.json`.
    pub index_url: String,
    /// Mach `index.json`.
    pub mach_index_url: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            builds_url: DEFAULT_BUILDS_URL.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            mach_index_url: DEFAULT_MACH_INDEX_URL.to_string(),
        }
    }
}

impl Sources {
    /// Returns the index to consult first for a specifier.
    #[must_use]
    pub fn index_for(&self, mach: bool) -> &str {
        if mach {
            &self.mach_index_url
        } else {
            &self.index_url
        }
    }
}
