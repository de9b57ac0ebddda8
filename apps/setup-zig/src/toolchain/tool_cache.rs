//! Job-local tool cache.
//!
//! Layout mirrors the runner's hosted tool cache so that entries placed by the
//! runner image are found as well:
//!
//! ```text
//! <root>/<tool>/<version>/<arch>/
//! <root>/<tool>/<version>/<arch>.complete
//! ```
//!
//! An entry counts only once its `.complete` marker exists, which
//! [`ToolCache::cache_dir`] writes after the copy has finished.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use setup_zig_versions::specifier::clean_version;
use tracing::debug;
use walkdir::WalkDir;

/// Handle on a tool cache root directory.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory an entry occupies, whether or not it exists.
    #[must_use]
    pub fn install_dir(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(tool).join(cache_version(version)).join(arch)
    }

    /// Looks up a completed entry.
    #[must_use]
    pub fn find(&self, tool: &str, version: &str, arch: &str) -> Option<PathBuf> {
        let dir = self.install_dir(tool, version, arch);
        let marker = marker_path(&dir);
        if dir.is_dir() && marker.is_file() {
            debug!(path = %dir.display(), "tool cache hit");
            Some(dir)
        } else {
            debug!(path = %dir.display(), "tool cache miss");
            None
        }
    }

    /// Copies `source` into the cache and marks the entry complete.
    ///
    /// Any previous entry for the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the cache cannot be
    /// written.
    pub fn cache_dir(&self, source: &Path, tool: &str, version: &str, arch: &str) -> Result<PathBuf> {
        let dest = self.install_dir(tool, version, arch);
        let marker = marker_path(&dest);

        if marker.exists() {
            std::fs::remove_file(&marker)
                .with_context(|| format!("Failed to remove {}", marker.display()))?;
        }
        if dest.exists() {
            std::fs::remove_dir_all(&dest)
                .with_context(|| format!("Failed to remove {}", dest.display()))?;
        }

        copy_tree(source, &dest)?;

        std::fs::write(&marker, b"")
            .with_context(|| format!("Failed to write {}", marker.display()))?;
        debug!(source = %source.display(), dest = %dest.display(), "cached directory");
        Ok(dest)
    }
}

/// Returns the version component used on disk: semver-clean when possible.
fn cache_version(version: &str) -> String {
    clean_version(version).unwrap_or_else(|| version.to_string())
}

/// Returns `<dir>.complete`.
fn marker_path(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(".complete");
    PathBuf::from(name)
}

/// Recursively copies `source` to `dest`, recreating symlinks on Unix.
fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let rel_path = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", entry.path().display(), source.display()))?;
        let target = dest.join(rel_path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to =
        std::fs::read_link(link).with_context(|| format!("Failed to read link {}", link.display()))?;
    std::os::unix::fs::symlink(&points_to, target)
        .with_context(|| format!("Failed to create symlink {}", target.display()))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    std::fs::copy(link, target)
        .map(|_| ())
        .with_context(|| format!("Failed to copy {} to {}", link.display(), target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    fn fake_toolchain(root: &Path) -> PathBuf {
        let dir = root.join("zig-linux-x86_64-0.11.0");
        std::fs::create_dir_all(dir.join("lib").join("std")).unwrap();
        std::fs::write(dir.join("zig"), b"zig binary").unwrap();
        std::fs::write(dir.join("lib").join("std").join("std.zig"), b"").unwrap();
        dir
    }

    #[test]
    fn install_dir_follows_runner_layout() {
        let cache = ToolCache::new("/opt/hostedtoolcache");
        assert_eq!(
            cache.install_dir("zig", "0.11.0", "x64"),
            PathBuf::from("/opt/hostedtoolcache/zig/0.11.0/x64")
        );
        assert_eq!(
            cache.install_dir("zig", "v0.11.0", "arm64"),
            PathBuf::from("/opt/hostedtoolcache/zig/0.11.0/arm64")
        );
    }

    #[test]
    fn find_misses_empty_cache() {
        let temp = TempDir::new().unwrap();
        let cache = ToolCache::new(temp.path());
        assert_eq!(cache.find("zig", "0.11.0", "x64"), None);
    }

    #[test]
    fn cache_dir_copies_and_marks_complete() {
        let temp = TempDir::new().unwrap();
        let source = fake_toolchain(&temp.path().join("extract"));
        let cache = ToolCache::new(temp.path().join("tool-cache"));

        let cached = cache.cache_dir(&source, "zig", "0.11.0", "x64").unwrap();

        assert_eq!(cached, cache.install_dir("zig", "0.11.0", "x64"));
        assert_eq!(std::fs::read(cached.join("zig")).unwrap(), b"zig binary");
        assert!(cached.join("lib").join("std").join("std.zig").exists());
        assert!(temp.path().join("tool-cache/zig/0.11.0/x64.complete").exists());
        assert_eq!(cache.find("zig", "0.11.0", "x64"), Some(cached));
    }

    #[test]
    fn directory_without_marker_is_not_found() {
        let temp = TempDir::new().unwrap();
        let cache = ToolCache::new(temp.path());
        std::fs::create_dir_all(cache.install_dir("zig", "0.11.0", "x64")).unwrap();

        assert_eq!(cache.find("zig", "0.11.0", "x64"), None);
    }

    #[test]
    fn cache_dir_replaces_previous_entry() {
        let temp = TempDir::new().unwrap();
        let source = fake_toolchain(&temp.path().join("extract"));
        let cache = ToolCache::new(temp.path().join("tool-cache"));
        let stale = cache.install_dir("zig", "0.11.0", "x64");
        std::fs::create_dir_all(&stale).unwrap();
        std::fs::write(stale.join("stale"), b"old").unwrap();

        let cached = cache.cache_dir(&source, "zig", "0.11.0", "x64").unwrap();

        assert!(!cached.join("stale").exists());
        assert!(cached.join("zig").exists());
    }

    #[test]
    fn marker_sits_next_to_entry() {
        assert_eq!(
            marker_path(Path::new("/cache/zig/0.11.0/x64")),
            PathBuf::from("/cache/zig/0.11.0/x64.complete")
        );
    }
}
