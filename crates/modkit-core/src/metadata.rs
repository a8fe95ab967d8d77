use std::fmt;
use std::path::{Path, PathBuf};

use crate::manifest::Manifest;

/// Why a mod entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModFailReason {
    /// The manifest file is missing, unparseable, or missing required fields.
    ParseError,
    /// The compatibility override source flags this mod as broken.
    AssumedBroken,
    /// The mod needs a newer host API version.
    HostVersionTooOld,
    /// The mod needs a newer platform version.
    PlatformVersionTooOld,
    /// The declared entry assembly doesn't exist in the mod folder.
    MissingEntryFile,
    /// Another installed mod declares the same unique ID.
    DuplicateId,
    /// A required dependency is missing or failed to load.
    MissingRequiredDependency,
    /// A dependency is installed but older than the declared minimum.
    DependencyVersionTooLow,
    /// The mod is part of a dependency cycle.
    CircularDependency,
    /// An unexpected error occurred while loading the entry.
    LoadFailed,
}

impl fmt::Display for ModFailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModFailReason::ParseError => "parse error",
            ModFailReason::AssumedBroken => "assumed broken",
            ModFailReason::HostVersionTooOld => "host version too old",
            ModFailReason::PlatformVersionTooOld => "platform version too old",
            ModFailReason::MissingEntryFile => "missing entry file",
            ModFailReason::DuplicateId => "duplicate unique ID",
            ModFailReason::MissingRequiredDependency => "missing required dependency",
            ModFailReason::DependencyVersionTooLow => "dependency version too low",
            ModFailReason::CircularDependency => "circular dependency",
            ModFailReason::LoadFailed => "load failed",
        };
        write!(f, "{label}")
    }
}

/// The load status of a mod entry.
///
/// An entry can never be read as failed without a reason, or found with a
/// populated error: the failure payload lives inside the `Failed` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModStatus {
    /// The manifest was read successfully and no check has failed yet.
    Found,
    /// The entry failed a check and will not be loaded.
    Failed { reason: ModFailReason, message: String },
}

/// A discovered mod entry: a manifest (when one could be parsed) plus its
/// status state machine.
///
/// One instance exists per non-ignored mod folder. Status moves from `Found`
/// to `Failed` at most once, through [`ModMetadata::set_failed`]; it never
/// reverts.
#[derive(Debug, Clone)]
pub struct ModMetadata {
    manifest: Option<Manifest>,
    directory_path: PathBuf,
    status: ModStatus,
}

impl ModMetadata {
    /// Create an entry for a successfully parsed manifest.
    pub fn found(manifest: Manifest, directory_path: PathBuf) -> Self {
        Self {
            manifest: Some(manifest),
            directory_path,
            status: ModStatus::Found,
        }
    }

    /// Create an entry that failed before a manifest could be parsed.
    pub fn failed(directory_path: PathBuf, reason: ModFailReason, message: impl Into<String>) -> Self {
        Self {
            manifest: None,
            directory_path,
            status: ModStatus::Failed { reason, message: message.into() },
        }
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }

    pub fn status(&self) -> &ModStatus {
        &self.status
    }

    pub fn is_found(&self) -> bool {
        matches!(self.status, ModStatus::Found)
    }

    pub fn is_failed(&self) -> bool {
        !self.is_found()
    }

    pub fn fail_reason(&self) -> Option<ModFailReason> {
        match &self.status {
            ModStatus::Found => None,
            ModStatus::Failed { reason, .. } => Some(*reason),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ModStatus::Found => None,
            ModStatus::Failed { message, .. } => Some(message),
        }
    }

    /// Mark this entry as failed. The first failure wins: marking an
    /// already-failed entry is a no-op, so `Failed` never reverts and the
    /// original cause is kept.
    pub fn set_failed(&mut self, reason: ModFailReason, message: impl Into<String>) {
        if self.is_failed() {
            return;
        }
        let message = message.into();
        log::debug!("marking mod '{}' as failed ({reason}): {message}", self.display_name());
        self.status = ModStatus::Failed { reason, message };
    }

    /// The mod's unique ID, if a manifest was parsed.
    pub fn unique_id(&self) -> Option<&str> {
        self.manifest.as_ref().map(|m| m.unique_id.as_str())
    }

    /// Whether this mod has the given unique ID. IDs compare
    /// case-insensitively.
    pub fn has_id(&self, unique_id: &str) -> bool {
        match self.unique_id() {
            Some(id) => ids_equal(id, unique_id),
            None => false,
        }
    }

    /// Whether this entry is a content-only package (no entry assembly).
    pub fn is_content_package(&self) -> bool {
        self.manifest.as_ref().is_some_and(|m| m.is_content_pack())
    }

    /// The manifest name when available, else the folder name.
    pub fn display_name(&self) -> &str {
        if let Some(manifest) = &self.manifest {
            return &manifest.name;
        }
        self.directory_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("<unknown mod>")
    }
}

/// Case-insensitive unique-ID comparison, used everywhere IDs are matched.
pub(crate) fn ids_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// The canonical lookup key for a unique ID.
pub(crate) fn id_key(unique_id: &str) -> String {
    unique_id.to_lowercase()
}
