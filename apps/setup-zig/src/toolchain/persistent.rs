//! Host-local persistent cache.
//!
//! Survives across jobs on the same machine. Entries are addressed by a
//! string key and hold one directory tree each.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tar::{Archive, Builder};
use tracing::debug;

/// Key-addressed storage for directory trees.
pub trait PersistentCache: Send + Sync {
    /// Restores the entry stored under `key` into `path`.
    ///
    /// Returns the matched key, or `None` when there is no such entry.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry exists but cannot be unpacked.
    fn restore(&self, path: &Path, key: &str) -> Result<Option<String>>;

    /// Stores the tree at `path` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be read or the entry cannot be
    /// written.
    fn save(&self, path: &Path, key: &str) -> Result<()>;
}

/// Keeps every entry as an uncompressed `<root>/<key>.tar`.
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.tar"))
    }
}

impl PersistentCache for DirectoryCache {
    fn restore(&self, path: &Path, key: &str) -> Result<Option<String>> {
        let entry = self.entry_path(key);
        if !entry.is_file() {
            debug!(%key, "persistent cache miss");
            return Ok(None);
        }

        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        let file =
            File::open(&entry).with_context(|| format!("Failed to open {}", entry.display()))?;

        if let Err(e) = Archive::new(file).unpack(path) {
            let _ = std::fs::remove_dir_all(path);
            return Err(e).with_context(|| {
                format!("Failed to restore {} into {}", entry.display(), path.display())
            });
        }

        debug!(%key, path = %path.display(), "persistent cache hit");
        Ok(Some(key.to_string()))
    }

    fn save(&self, path: &Path, key: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;

        let entry = self.entry_path(key);
        let temp = self
            .root
            .join(format!("{key}.tar.{}.tmp", std::process::id()));

        let result = write_tarball(path, &temp)
            .and_then(|()| {
                std::fs::rename(&temp, &entry).with_context(|| {
                    format!("Failed to rename {} to {}", temp.display(), entry.display())
                })
            });
        if result.is_err() {
            let _ = std::fs::remove_file(&temp);
        }
        result?;

        debug!(%key, entry = %entry.display(), "saved persistent cache entry");
        Ok(())
    }
}

/// Archives the contents of `source` into a new tarball at `dest`.
fn write_tarball(source: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut builder = Builder::new(file);
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", source)
        .with_context(|| format!("Failed to archive {}", source.display()))?;
    builder
        .into_inner()
        .with_context(|| format!("Failed to finish {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    const KEY: &str = "zig-zig-linux-x86_64-0.11.0";

    fn populated_dir(root: &Path) -> PathBuf {
        let dir = root.join("zig").join("0.11.0").join("x64");
        std::fs::create_dir_all(dir.join("lib")).unwrap();
        std::fs::write(dir.join("zig"), b"zig binary").unwrap();
        std::fs::write(dir.join("lib").join("compiler_rt.zig"), b"").unwrap();
        dir
    }

    #[test]
    fn restore_misses_unknown_key() {
        let temp = TempDir::new().unwrap();
        let cache = DirectoryCache::new(temp.path().join("cache"));
        let target = temp.path().join("restore");

        assert_eq!(cache.restore(&target, KEY).unwrap(), None);
        assert!(!target.exists());
    }

    #[test]
    fn save_then_restore_reproduces_tree() {
        let temp = TempDir::new().unwrap();
        let source = populated_dir(&temp.path().join("tool-cache"));
        let cache = DirectoryCache::new(temp.path().join("cache"));

        cache.save(&source, KEY).unwrap();
        let target = temp.path().join("elsewhere");
        let restored = cache.restore(&target, KEY).unwrap();

        assert_eq!(restored.as_deref(), Some(KEY));
        assert_eq!(std::fs::read(target.join("zig")).unwrap(), b"zig binary");
        assert!(target.join("lib").join("compiler_rt.zig").exists());
    }

    #[test]
    fn save_writes_one_tarball_per_key() {
        let temp = TempDir::new().unwrap();
        let source = populated_dir(&temp.path().join("tool-cache"));
        let root = temp.path().join("cache");
        let cache = DirectoryCache::new(&root);

        cache.save(&source, KEY).unwrap();
        cache.save(&source, KEY).unwrap();

        let names: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{KEY}.tar")]);
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("cache");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join(format!("{KEY}.tar")), vec![0xffu8; 1024]).unwrap();
        let cache = DirectoryCache::new(&root);
        let target = temp.path().join("restore");

        assert!(cache.restore(&target, KEY).is_err());
        assert!(!target.exists());
    }
}
