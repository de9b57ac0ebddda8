//! The three-level lookup chain.
//!
//! 1. [`JobLocalTier`] - the unpacked tool cache inside the job environment.
//! 2. [`HostLocalTier`] - the persistent cache on the machine running jobs.
//! 3. [`RemoteTier`] - the download host itself.
//!
//! Tiers are polled in that order and the first one to produce a directory
//! wins. A miss is `Ok(None)`; only real failures are errors. Entries in the
//! first two tiers are only ever created by a remote fetch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use setup_zig_versions::{Artifact, HostArch};
use tracing::{debug, warn};

use crate::actions;
use crate::errors::SetupError;
use crate::toolchain::archive::extract_archive;
use crate::toolchain::download::{download_file, format_bytes};
use crate::toolchain::persistent::PersistentCache;
use crate::toolchain::tool_cache::ToolCache;

/// Name the toolchain is cached under.
pub const TOOL_NAME: &str = "zig";

/// Position of a tier in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierKind {
    JobLocal,
    HostLocal,
    Remote,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TierKind::JobLocal => "job-local",
            TierKind::HostLocal => "host-local",
            TierKind::Remote => "remote",
        };
        write!(f, "{name}")
    }
}

/// What the chain is asked to provide.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub artifact: Artifact,
    /// Architecture the toolchain is cached under in the tool cache.
    pub arch: HostArch,
    /// Whether the host-local tier is read and written.
    pub use_cache: bool,
}

impl InstallRequest {
    /// Key of the host-local entry: `zig-<variantName>`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.artifact.cache_key(TOOL_NAME)
    }
}

/// One level of the cache hierarchy.
#[async_trait]
pub trait Tier: Send + Sync {
    fn kind(&self) -> TierKind;

    /// Produces the install directory, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only when the tier fails, never for a miss.
    async fn try_fetch(&self, request: &InstallRequest) -> Result<Option<PathBuf>>;
}

/// Tier1: completed entries of the job's tool cache.
pub struct JobLocalTier {
    tool_cache: ToolCache,
}

impl JobLocalTier {
    #[must_use]
    pub fn new(tool_cache: ToolCache) -> Self {
        Self { tool_cache }
    }
}

#[async_trait]
impl Tier for JobLocalTier {
    fn kind(&self) -> TierKind {
        TierKind::JobLocal
    }

    async fn try_fetch(&self, request: &InstallRequest) -> Result<Option<PathBuf>> {
        let version = &request.artifact.version;
        let found = self
            .tool_cache
            .find(TOOL_NAME, version, request.arch.as_str());
        if let Some(path) = &found {
            actions::info(&format!(
                "using cached zig install (version {version}): {}",
                path.display()
            ));
        }
        Ok(found)
    }
}

/// Tier2: the persistent cache, restored into the tool cache layout.
pub struct HostLocalTier {
    tool_cache: ToolCache,
    cache: Arc<dyn PersistentCache>,
}

impl HostLocalTier {
    #[must_use]
    pub fn new(tool_cache: ToolCache, cache: Arc<dyn PersistentCache>) -> Self {
        Self { tool_cache, cache }
    }
}

#[async_trait]
impl Tier for HostLocalTier {
    fn kind(&self) -> TierKind {
        TierKind::HostLocal
    }

    async fn try_fetch(&self, request: &InstallRequest) -> Result<Option<PathBuf>> {
        if !request.use_cache {
            debug!("host-local cache disabled");
            return Ok(None);
        }

        let key = request.cache_key();
        let restore_path = self.tool_cache.install_dir(
            TOOL_NAME,
            &request.artifact.version,
            request.arch.as_str(),
        );
        actions::info(&format!(
            "attempting restore of {key} to {}",
            restore_path.display()
        ));

        // A broken entry is reported and treated as a miss.
        match self.cache.restore(&restore_path, &key) {
            Ok(Some(_)) => {
                actions::info(&format!(
                    "using cached zig install: {}",
                    restore_path.display()
                ));
                Ok(Some(restore_path))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(%key, error = %format!("{e:#}"), "failed to restore cache entry");
                Ok(None)
            }
        }
    }
}

/// Tier3: download, extract, and populate the two local tiers.
pub struct RemoteTier {
    client: reqwest::Client,
    tool_cache: ToolCache,
    cache: Arc<dyn PersistentCache>,
    temp_dir: PathBuf,
}

impl RemoteTier {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        tool_cache: ToolCache,
        cache: Arc<dyn PersistentCache>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            tool_cache,
            cache,
            temp_dir,
        }
    }

    async fn fetch_into(&self, request: &InstallRequest, scratch: &Path) -> Result<PathBuf> {
        let artifact = &request.artifact;
        let variant = &artifact.variant_name;
        actions::info(&format!(
            "no cached version found. downloading zig {variant}"
        ));

        let archive_path = scratch.join(artifact.archive_file_name());
        let size = download_file(&self.client, &artifact.download_url, &archive_path).await?;
        debug!(url = %artifact.download_url, size = %format_bytes(size), "downloaded archive");

        let extract_dir = scratch.join("extract");
        extract_archive(&archive_path, artifact.archive_kind(), &extract_dir)?;
        actions::info(&format!(
            "{variant} zig downloaded and extracted to {}",
            extract_dir.display()
        ));

        let bin_path = extract_dir.join(&artifact.file_without_file_type);
        if !bin_path.is_dir() {
            return Err(SetupError::MissingArchiveRoot { path: bin_path }.into());
        }

        let cache_path = self.tool_cache.cache_dir(
            &bin_path,
            TOOL_NAME,
            &artifact.version,
            request.arch.as_str(),
        )?;

        if request.use_cache {
            let key = request.cache_key();
            actions::info(&format!(
                "adding zig {} at {} to local cache {key}",
                artifact.version,
                cache_path.display()
            ));
            if let Err(e) = self.cache.save(&cache_path, &key) {
                warn!(%key, error = %format!("{e:#}"), "failed to save cache entry");
            }
        }

        Ok(cache_path)
    }
}

#[async_trait]
impl Tier for RemoteTier {
    fn kind(&self) -> TierKind {
        TierKind::Remote
    }

    async fn try_fetch(&self, request: &InstallRequest) -> Result<Option<PathBuf>> {
        let scratch = self
            .temp_dir
            .join(format!("{}-{}", request.artifact.variant_name, std::process::id()));
        if scratch.exists() {
            std::fs::remove_dir_all(&scratch)
                .with_context(|| format!("Failed to remove {}", scratch.display()))?;
        }

        let result = self.fetch_into(request, &scratch).await;
        if scratch.exists()
            && let Err(e) = std::fs::remove_dir_all(&scratch)
        {
            warn!(path = %scratch.display(), error = %e, "failed to remove scratch directory");
        }
        result.map(Some)
    }
}

/// Ordered chain of tiers.
pub struct TieredCache {
    tiers: Vec<Box<dyn Tier>>,
}

impl TieredCache {
    #[must_use]
    pub fn new(tiers: Vec<Box<dyn Tier>>) -> Self {
        Self { tiers }
    }

    /// Builds the job-local, host-local, remote chain.
    #[must_use]
    pub fn standard(
        client: reqwest::Client,
        tool_cache: ToolCache,
        cache: Arc<dyn PersistentCache>,
        temp_dir: PathBuf,
    ) -> Self {
        Self::new(vec![
            Box::new(JobLocalTier::new(tool_cache.clone())),
            Box::new(HostLocalTier::new(tool_cache.clone(), Arc::clone(&cache))),
            Box::new(RemoteTier::new(client, tool_cache, cache, temp_dir)),
        ])
    }

    /// Returns the first directory a tier produces, with the tier that
    /// produced it.
    ///
    /// # Errors
    ///
    /// Returns the first tier failure, or [`SetupError::TiersExhausted`] when
    /// every tier misses.
    pub async fn fetch(&self, request: &InstallRequest) -> Result<(TierKind, PathBuf)> {
        for tier in &self.tiers {
            if let Some(path) = tier.try_fetch(request).await? {
                debug!(tier = %tier.kind(), path = %path.display(), "tier hit");
                return Ok((tier.kind(), path));
            }
            debug!(tier = %tier.kind(), "tier miss");
        }
        Err(SetupError::TiersExhausted {
            variant: request.artifact.variant_name.clone(),
        }
        .into())
    }
}
