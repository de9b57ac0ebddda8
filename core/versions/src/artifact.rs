//! The resolved download target.

/// Archive format of a Zig release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    Tar,
}

impl ArchiveKind {
    /// Picks the archive format from a file name or URL.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".zip") {
            Self::Zip
        } else {
            Self::Tar
        }
    }
}

/// Everything needed to download, unpack and cache one Zig build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Fully qualified URL of the `.zip` or `.tar.xz` archive.
    pub download_url: String,
    /// Top-level directory inside the archive.
    pub file_without_file_type: String,
    /// `zig-<os>-<arch>-<version>` without any commit suffix. Host cache key.
    pub variant_name: String,
    /// Normalized version. Job cache key.
    pub version: String,
}

impl Artifact {
    /// Returns the archive format implied by the download URL.
    #[must_use]
    pub fn archive_kind(&self) -> ArchiveKind {
        ArchiveKind::from_file_name(&self.download_url)
    }

    /// Returns the last path segment of the download URL.
    #[must_use]
    pub fn archive_file_name(&self) -> &str {
        self.download_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.download_url)
    }

    /// Returns the version component of [`Artifact::variant_name`].
    ///
    /// For mach calendar versions this is the underlying dev build
    /// (`0.12.0-dev.2063`), not the calendar tag.
    #[must_use]
    pub fn build_version(&self) -> &str {
        version_from_variant(&self.variant_name).unwrap_or(&self.version)
    }

    /// Returns the persistent cache key for `tool`.
    #[must_use]
    pub fn cache_key(&self, tool: &str) -> String {
        format!("{tool}-{}", self.variant_name)
    }
}

/// Extracts `<version>` from `zig-<os>-<arch>-<version>`.
#[must_use]
pub fn version_from_variant(variant_name: &str) -> Option<&str> {
    variant_name.splitn(4, '-').nth(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mach_artifact() -> Artifact {
        Artifact {
            download_url:
                "https://pkg.machengine.org/zig/zig-macos-aarch64-0.12.0-dev.2063+804cee3b9.tar.xz"
                    .to_string(),
            file_without_file_type: "zig-macos-aarch64-0.12.0-dev.2063+804cee3b9".to_string(),
            variant_name: "zig-macos-aarch64-0.12.0-dev.2063".to_string(),
            version: "2024.1.0-mach".to_string(),
        }
    }

    #[test]
    fn archive_kind_follows_extension() {
        assert_eq!(ArchiveKind::from_file_name("zig.zip"), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::from_file_name("zig.tar.xz"), ArchiveKind::Tar);
        assert_eq!(mach_artifact().archive_kind(), ArchiveKind::Tar);
    }

    #[test]
    fn archive_file_name_is_last_url_segment() {
        assert_eq!(
            mach_artifact().archive_file_name(),
            "zig-macos-aarch64-0.12.0-dev.2063+804cee3b9.tar.xz"
        );
    }

    #[test]
    fn build_version_reads_dev_build_from_variant() {
        let artifact = mach_artifact();
        assert_eq!(artifact.build_version(), "0.12.0-dev.2063");
        assert!(artifact.build_version().contains("dev."));
    }

    #[test]
    fn cache_key_prefixes_tool_name() {
        assert_eq!(
            mach_artifact().cache_key("zig"),
            "zig-zig-macos-aarch64-0.12.0-dev.2063"
        );
    }

    #[test]
    fn version_from_variant_keeps_dashes_after_third_segment() {
        assert_eq!(
            version_from_variant("zig-linux-x86_64-0.12.0-dev.3180"),
            Some("0.12.0-dev.3180")
        );
        assert_eq!(version_from_variant("zig-linux"), None);
    }
}
