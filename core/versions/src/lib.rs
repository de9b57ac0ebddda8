//! Zig version resolution.
//!
//! Turns a loose version specifier and a host platform into the concrete
//! archive to download, together with the keys used to cache it.
//!
//! ## Specifier Shapes
//!
//! - `0.12.0-dev.1092+68ed78775` - pinned to a commit, resolved offline by
//!   [`resolve_commit`].
//! - `0.11.0`, `~0.11`, `master` - looked up in the canonical index by
//!   [`IndexResolver::resolve_version`].
//! - `mach-latest`, `2024.1.0-mach` - looked up in the mach index, falling back
//!   to the canonical one.
//!
//! ## Cache Keys
//!
//! Every resolution yields an [`Artifact`]. Its `variant_name`
//! (`zig-<os>-<arch>-<version>`) never contains a commit hash, so the same
//! request keeps hitting the same cache entry even after the index moves on.
//!
//! ## Example
//!
//! ```rust,ignore
//! use setup_zig_versions::{IndexResolver, Platform, Sources};
//!
//! let platform = Platform::parse("x64", "linux")?;
//! let resolver = IndexResolver::new(Sources::default())?;
//! let artifact = resolver.resolve_version(platform, "0.11.0").await?;
//! println!("{}", artifact.download_url);
//! ```

pub mod artifact;
pub mod commit;
pub mod errors;
pub mod index;
pub mod platform;
pub mod sources;
pub mod specifier;

pub use artifact::{ArchiveKind, Artifact};
pub use commit::resolve_commit;
pub use errors::{Result, VersionError};
pub use index::{Index, IndexResolver, Release, Target};
pub use platform::{HostArch, HostOs, Platform, extension_for, map_arch, map_os};
pub use sources::Sources;
pub use specifier::VersionSpecifier;
