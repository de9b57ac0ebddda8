//! Toolchain acquisition.
//!
//! [`installer::Installer`] resolves a version specifier and hands the
//! resulting artifact to the [`tiers::TieredCache`], which consults the job
//! tool cache, then the host persistent cache, then downloads.

pub mod archive;
pub mod download;
pub mod installer;
pub mod persistent;
pub mod tiers;
pub mod tool_cache;

pub use installer::Installer;
