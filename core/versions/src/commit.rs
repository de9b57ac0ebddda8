//! Offline resolution of commit-pinned specifiers.
//!
//! A specifier such as `0.12.0-dev.1092+68ed78775` names one exact build on
//! the builds host, so the URL can be synthesized without consulting an index.
//! Mach specifiers never contain a `+` and so never arrive here.

use crate::artifact::Artifact;
use crate::errors::{Result, VersionError};
use crate::platform::Platform;
use crate::sources::Sources;
use crate::specifier::clean_version;

impl Sources {
    /// Resolves a commit-pinned specifier against [`Sources::builds_url`].
    ///
    /// The download URL and archive directory embed the raw specifier, hash
    /// included. The variant name and version drop the hash so that cache
    /// keys stay stable.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidPinnedVersion`] if the part before the
    /// hash is not a semantic version.
    pub fn resolve_commit(&self, platform: Platform, specifier: &str) -> Result<Artifact> {
        let version =
            clean_version(specifier).ok_or_else(|| VersionError::InvalidPinnedVersion {
                specifier: specifier.to_string(),
            })?;

        let prefix = platform.artifact_prefix();
        let ext = platform.archive_extension();
        let builds = self.builds_url.trim_end_matches('/');

        Ok(Artifact {
            download_url: format!("{builds}/{prefix}-{specifier}.{ext}"),
            file_without_file_type: format!("{prefix}-{specifier}"),
            variant_name: format!("{prefix}-{version}"),
            version,
        })
    }
}

/// Resolves a commit-pinned specifier against the public builds host.
///
/// # Errors
///
/// See [`Sources::resolve_commit`].
pub fn resolve_commit(platform: Platform, specifier: &str) -> Result<Artifact> {
    Sources::default().resolve_commit(platform, specifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(arch: &str, os: &str) -> Platform {
        Platform::parse(arch, os).unwrap()
    }

    #[test]
    fn linux_release_with_hash() {
        let artifact = resolve_commit(platform("x64", "linux"), "0.6.0+4b48fccad").unwrap();
        assert_eq!(
            artifact,
            Artifact {
                download_url: "https://ziglang.org/builds/zig-linux-x86_64-0.6.0+4b48fccad.tar.xz"
                    .to_string(),
                file_without_file_type: "zig-linux-x86_64-0.6.0+4b48fccad".to_string(),
                variant_name: "zig-linux-x86_64-0.6.0".to_string(),
                version: "0.6.0".to_string(),
            }
        );
    }

    #[test]
    fn windows_release_uses_zip() {
        let artifact = resolve_commit(platform("x64", "win32"), "0.6.0+4b48fccad").unwrap();
        assert_eq!(
            artifact.download_url,
            "https://ziglang.org/builds/zig-windows-x86_64-0.6.0+4b48fccad.zip"
        );
        assert_eq!(
            artifact.file_without_file_type,
            "zig-windows-x86_64-0.6.0+4b48fccad"
        );
        assert_eq!(artifact.variant_name, "zig-windows-x86_64-0.6.0");
        assert_eq!(artifact.version, "0.6.0");
    }

    #[test]
    fn dev_build_keeps_prerelease_and_drops_hash() {
        let artifact =
            resolve_commit(platform("x64", "win32"), "0.12.0-dev.1092+68ed78775").unwrap();
        assert_eq!(
            artifact.download_url,
            "https://ziglang.org/builds/zig-windows-x86_64-0.12.0-dev.1092+68ed78775.zip"
        );
        assert_eq!(artifact.variant_name, "zig-windows-x86_64-0.12.0-dev.1092");
        assert_eq!(artifact.version, "0.12.0-dev.1092");
    }

    #[test]
    fn macos_dev_build() {
        let artifact =
            resolve_commit(platform("x64", "darwin"), "0.12.0-dev.1150+3c22cecee").unwrap();
        assert_eq!(
            artifact.download_url,
            "https://ziglang.org/builds/zig-macos-x86_64-0.12.0-dev.1150+3c22cecee.tar.xz"
        );
        assert_eq!(
            artifact.file_without_file_type,
            "zig-macos-x86_64-0.12.0-dev.1150+3c22cecee"
        );
        assert_eq!(artifact.variant_name, "zig-macos-x86_64-0.12.0-dev.1150");
        assert_eq!(artifact.version, "0.12.0-dev.1150");
    }

    #[test]
    fn resolution_is_idempotent_and_hash_free() {
        let specifiers = [
            ("0.6.0", "4b48fccad"),
            ("0.12.0-dev.1092", "68ed78775"),
            ("0.13.0-dev.46", "3648d7df1"),
        ];
        for (version, hash) in specifiers {
            let spec = format!("{version}+{hash}");
            let first = resolve_commit(platform("arm64", "linux"), &spec).unwrap();
            let second = resolve_commit(platform("arm64", "linux"), &spec).unwrap();
            assert_eq!(first, second);
            assert!(!first.variant_name.contains(hash));
            assert!(!first.version.contains(hash));
            assert!(first.download_url.contains(hash));
        }
    }

    #[test]
    fn custom_builds_host_is_used_verbatim() {
        let sources = Sources {
            builds_url: "http://127.0.0.1:8080/builds/".to_string(),
            ..Sources::default()
        };
        let artifact = sources
            .resolve_commit(platform("riscv64", "linux"), "0.11.0+abc")
            .unwrap();
        assert_eq!(
            artifact.download_url,
            "http://127.0.0.1:8080/builds/zig-linux-riscv64-0.11.0+abc.tar.xz"
        );
    }

    #[test]
    fn non_semver_pin_is_rejected() {
        let err = resolve_commit(platform("x64", "linux"), "master+abc").unwrap_err();
        assert!(matches!(err, VersionError::InvalidPinnedVersion { .. }));
    }
}
