//! # Modkit Core
//!
//! Mod manifest validation and dependency resolution for a mod-hosting
//! application. Given a set of independently authored mod packages, each
//! self-describing via a manifest, this crate determines which packages are
//! well-formed and compatible, and computes a deterministic load order that
//! places every mod after its resolved required dependencies. Broken or
//! cyclic subgraphs are isolated and marked failed instead of aborting the
//! whole batch.
//!
//! ## Key submodules and responsibilities:
//!
//! - **[`version`]**: Parses and totally orders semantic versions, including
//!   prerelease tags.
//! - **[`manifest`]**: The immutable parsed shape of a mod's self-description
//!   ([`Manifest`], [`ManifestDependency`]).
//! - **[`decoder`]**: The externally supplied decode step turning raw
//!   manifest text into a [`Manifest`].
//! - **[`metadata`]**: The per-mod status state machine ([`ModMetadata`]),
//!   the unit the resolver operates on.
//! - **[`compat`]**: Curated compatibility overrides (assume-broken flags,
//!   version corrections).
//! - **[`lookup`]**: File-existence checks with configurable case
//!   sensitivity.
//! - **[`resolver`]**: The three operations: manifest intake, structural
//!   validation, and stable dependency-first ordering.
//!
//! The resolver is synchronous and single-threaded; it runs once during host
//! startup. Resolving two disjoint collections concurrently is safe, but a
//! single collection must not be shared across threads mid-resolution.

pub mod compat;
pub mod decoder;
pub mod lookup;
pub mod manifest;
pub mod metadata;
pub mod resolver;
pub mod version;

pub use compat::{CompatDatabase, CompatOverride, CompatSource};
pub use decoder::{JsonManifestDecoder, ManifestDecoder, ManifestError};
pub use lookup::{DiskFileLookup, FileLookup};
pub use manifest::{Manifest, ManifestDependency};
pub use metadata::{ModFailReason, ModMetadata, ModStatus};
pub use resolver::{FolderFilter, ModResolver, MANIFEST_FILE};
pub use version::{SemanticVersion, VersionError};

#[cfg(feature = "toml-manifest")]
pub use decoder::TomlManifestDecoder;

// Test module declaration
#[cfg(test)]
mod tests;
