//! Compatibility overrides.
//!
//! The host can ship curated metadata about known mods: some are flagged as
//! unconditionally broken, some carry a corrected version used when other
//! mods check their minimum-version constraints against them.

use std::collections::HashMap;

use crate::metadata::id_key;
use crate::version::SemanticVersion;

/// Curated override data for a single unique ID.
#[derive(Debug, Clone, Default)]
pub struct CompatOverride {
    /// Whether the mod is known to be broken regardless of its manifest.
    pub assume_broken: bool,

    /// A corrected version to use instead of the manifest version when this
    /// mod is resolved as a dependency of another mod.
    pub version_override: Option<SemanticVersion>,
}

impl CompatOverride {
    /// An override that flags the mod as unconditionally broken.
    pub fn broken() -> Self {
        Self { assume_broken: true, version_override: None }
    }

    /// An override that corrects the version other mods resolve against.
    pub fn version(version: SemanticVersion) -> Self {
        Self { assume_broken: false, version_override: Some(version) }
    }
}

/// Source of compatibility overrides, keyed by unique ID.
pub trait CompatSource {
    fn lookup(&self, unique_id: &str) -> Option<&CompatOverride>;
}

/// In-memory compatibility database. IDs match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CompatDatabase {
    entries: HashMap<String, CompatOverride>,
}

impl CompatDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the override for a unique ID.
    pub fn insert(&mut self, unique_id: &str, entry: CompatOverride) -> &mut Self {
        self.entries.insert(id_key(unique_id), entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompatSource for CompatDatabase {
    fn lookup(&self, unique_id: &str) -> Option<&CompatOverride> {
        self.entries.get(&id_key(unique_id))
    }
}
