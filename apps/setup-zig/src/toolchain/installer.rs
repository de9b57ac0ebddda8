//! Resolution followed by the tier chain.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use setup_zig_versions::{Artifact, IndexResolver, Platform, Sources, VersionSpecifier};
use tracing::{debug, info};

use crate::config::Config;
use crate::toolchain::download::http_client;
use crate::toolchain::persistent::DirectoryCache;
use crate::toolchain::tiers::{InstallRequest, TieredCache};
use crate::toolchain::tool_cache::ToolCache;

/// Installs Zig toolchains for one run.
pub struct Installer {
    resolver: IndexResolver,
    tiers: TieredCache,
}

impl Installer {
    /// Wires the resolvers and the tier chain from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let resolver = IndexResolver::new(config.sources.clone())?;
        let tiers = TieredCache::standard(
            http_client()?,
            ToolCache::new(&config.tool_cache_dir),
            Arc::new(DirectoryCache::new(&config.persistent_cache_dir)),
            config.temp_dir.clone(),
        );
        Ok(Self { resolver, tiers })
    }

    fn sources(&self) -> &Sources {
        self.resolver.sources()
    }

    /// Turns a specifier into the artifact to install.
    ///
    /// Commit-pinned specifiers are resolved offline; everything else goes
    /// through the download index.
    ///
    /// # Errors
    ///
    /// Returns any resolution error.
    pub async fn resolve(&self, platform: Platform, specifier: &str) -> Result<Artifact> {
        let artifact = match VersionSpecifier::parse(specifier) {
            VersionSpecifier::Pinned(raw) => self.sources().resolve_commit(platform, &raw)?,
            VersionSpecifier::Loose(raw) => self.resolver.resolve_version(platform, &raw).await?,
        };
        debug!(
            url = %artifact.download_url,
            variant = %artifact.variant_name,
            version = %artifact.version,
            "resolved artifact"
        );
        Ok(artifact)
    }

    /// Makes `specifier` available locally and returns its directory.
    ///
    /// # Errors
    ///
    /// Returns resolution, download, extraction, or tool cache errors.
    /// Persistent cache failures are logged and do not fail the install.
    pub async fn install_toolchain(
        &self,
        platform: Platform,
        specifier: &str,
        use_cache: bool,
    ) -> Result<PathBuf> {
        let artifact = self.resolve(platform, specifier).await?;
        let request = InstallRequest {
            artifact,
            arch: platform.arch,
            use_cache,
        };

        let (tier, path) = self.tiers.fetch(&request).await?;
        info!(%tier, path = %path.display(), "toolchain ready");
        Ok(path)
    }
}
