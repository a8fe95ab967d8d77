use crate::version::SemanticVersion;

/// The parsed self-description of a mod package.
///
/// This is the immutable output of a [`ManifestDecoder`](crate::decoder::ManifestDecoder);
/// the resolver never mutates it.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Unique identifier for the mod. Compared case-insensitively everywhere.
    pub unique_id: String,

    /// Human-readable name
    pub name: String,

    /// Mod author
    pub author: String,

    /// Mod version
    pub version: SemanticVersion,

    /// The entry assembly to load, relative to the mod folder. `None` marks a
    /// content-only package with no executable entry point.
    pub entry_assembly: Option<String>,

    /// The minimum host API version this mod needs, if any
    pub minimum_host_api_version: Option<SemanticVersion>,

    /// The minimum platform version this mod needs, if any
    pub minimum_platform_version: Option<SemanticVersion>,

    /// Declared prerequisites, in declaration order
    pub dependencies: Vec<ManifestDependency>,

    /// The unique ID of the mod this package provides content for, if any
    pub content_pack_for: Option<String>,
}

impl Manifest {
    /// Create a minimal manifest with no entry assembly and no dependencies.
    pub fn new(unique_id: &str, name: &str, author: &str, version: SemanticVersion) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            name: name.to_string(),
            author: author.to_string(),
            version,
            entry_assembly: None,
            minimum_host_api_version: None,
            minimum_platform_version: None,
            dependencies: Vec::new(),
            content_pack_for: None,
        }
    }

    /// Whether this manifest describes a content-only package (no entry
    /// assembly to load).
    pub fn is_content_pack(&self) -> bool {
        self.entry_assembly.is_none()
    }

    /// Add a dependency
    pub fn add_dependency(&mut self, dependency: ManifestDependency) -> &mut Self {
        self.dependencies.push(dependency);
        self
    }
}

/// A declared prerequisite on another mod.
#[derive(Debug, Clone)]
pub struct ManifestDependency {
    /// The unique ID of the required mod
    pub unique_id: String,

    /// The minimum acceptable version, if any
    pub minimum_version: Option<SemanticVersion>,

    /// Whether this is a hard requirement or an optional dependency
    pub required: bool,
}

impl ManifestDependency {
    /// Create a required dependency with a minimum version
    pub fn required(unique_id: &str, minimum_version: SemanticVersion) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            minimum_version: Some(minimum_version),
            required: true,
        }
    }

    /// Create a required dependency on any version
    pub fn required_any(unique_id: &str) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            minimum_version: None,
            required: true,
        }
    }

    /// Create an optional dependency with a minimum version
    pub fn optional(unique_id: &str, minimum_version: SemanticVersion) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            minimum_version: Some(minimum_version),
            required: false,
        }
    }

    /// Create an optional dependency on any version
    pub fn optional_any(unique_id: &str) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            minimum_version: None,
            required: false,
        }
    }
}
