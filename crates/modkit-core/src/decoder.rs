//! Manifest decoding.
//!
//! Decoding raw manifest text into the structured [`Manifest`] model is an
//! externally supplied step: the resolver only sees the [`ManifestDecoder`]
//! trait. [`JsonManifestDecoder`] is the default implementation; a TOML
//! decoder is available behind the `toml-manifest` feature.

use serde::Deserialize;

use crate::manifest::{Manifest, ManifestDependency};
use crate::version::{SemanticVersion, VersionError};

/// Error produced while decoding a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to parse manifest: {message}")]
    Syntax {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("manifest field '{field}' is missing or empty")]
    MissingField { field: String },

    #[error("manifest field '{field}' is invalid: {source}")]
    InvalidVersion {
        field: String,
        #[source]
        source: VersionError,
    },
}

/// Decodes raw manifest text into a [`Manifest`].
pub trait ManifestDecoder {
    fn decode(&self, raw: &str) -> Result<Manifest, ManifestError>;
}

// --- Intermediate structs for deserialization ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawDependency {
    unique_id: String,
    #[serde(default)]
    minimum_version: Option<String>,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    unique_id: String,
    name: String,
    #[serde(default)]
    author: String,
    version: String,
    #[serde(default)]
    entry_assembly: Option<String>,
    #[serde(default)]
    minimum_host_api_version: Option<String>,
    #[serde(default)]
    minimum_platform_version: Option<String>,
    #[serde(default)]
    dependencies: Vec<RawDependency>,
    #[serde(default)]
    content_pack_for: Option<String>,
}

impl RawManifest {
    /// Convert the raw shape into the typed model, parsing version strings.
    fn into_manifest(self) -> Result<Manifest, ManifestError> {
        if self.unique_id.trim().is_empty() {
            return Err(ManifestError::MissingField { field: "uniqueId".to_string() });
        }
        if self.name.trim().is_empty() {
            return Err(ManifestError::MissingField { field: "name".to_string() });
        }

        let version = parse_version_field("version", &self.version)?;
        let minimum_host_api_version = self
            .minimum_host_api_version
            .as_deref()
            .map(|raw| parse_version_field("minimumHostApiVersion", raw))
            .transpose()?;
        let minimum_platform_version = self
            .minimum_platform_version
            .as_deref()
            .map(|raw| parse_version_field("minimumPlatformVersion", raw))
            .transpose()?;

        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for raw_dep in self.dependencies {
            if raw_dep.unique_id.trim().is_empty() {
                return Err(ManifestError::MissingField {
                    field: "dependencies.uniqueId".to_string(),
                });
            }
            let minimum_version = raw_dep
                .minimum_version
                .as_deref()
                .map(|raw| parse_version_field("dependencies.minimumVersion", raw))
                .transpose()?;
            dependencies.push(ManifestDependency {
                unique_id: raw_dep.unique_id,
                minimum_version,
                required: raw_dep.required,
            });
        }

        Ok(Manifest {
            unique_id: self.unique_id,
            name: self.name,
            author: self.author,
            version,
            entry_assembly: self.entry_assembly,
            minimum_host_api_version,
            minimum_platform_version,
            dependencies,
            content_pack_for: self.content_pack_for,
        })
    }
}

fn parse_version_field(field: &str, raw: &str) -> Result<SemanticVersion, ManifestError> {
    SemanticVersion::parse(raw).map_err(|source| ManifestError::InvalidVersion {
        field: field.to_string(),
        source,
    })
}

// --- End Intermediate structs ---

/// Decodes JSON manifests. This is the format the host ships with.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestDecoder;

impl JsonManifestDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestDecoder for JsonManifestDecoder {
    fn decode(&self, raw: &str) -> Result<Manifest, ManifestError> {
        let raw_manifest: RawManifest =
            serde_json::from_str(raw).map_err(|e| ManifestError::Syntax {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        raw_manifest.into_manifest()
    }
}

/// Decodes TOML manifests with the same field shape as the JSON format.
#[cfg(feature = "toml-manifest")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestDecoder;

#[cfg(feature = "toml-manifest")]
impl TomlManifestDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "toml-manifest")]
impl ManifestDecoder for TomlManifestDecoder {
    fn decode(&self, raw: &str) -> Result<Manifest, ManifestError> {
        let raw_manifest: RawManifest = toml::from_str(raw).map_err(|e| ManifestError::Syntax {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        raw_manifest.into_manifest()
    }
}
