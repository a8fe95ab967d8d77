use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Version};

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,
    #[error("invalid version '{raw}': {message}")]
    Invalid { raw: String, message: String },
}

/// A semantic version in `MAJOR.MINOR.PATCH[-PRERELEASE]` form.
///
/// Parsing is more lenient than strict SemVer: the minor and patch numbers
/// default to zero when omitted, so `"1"` and `"1.2"` are accepted. Build
/// metadata is stripped at parse time and never affects ordering.
///
/// Ordering is total: numeric parts compare ascending, a release is newer
/// than any prerelease of the same `major.minor.patch`, and prerelease tags
/// compare dot-segment-wise (numeric segments numerically, others lexically).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersion {
    inner: Version,
}

impl SemanticVersion {
    /// Creates a release version with no prerelease tag.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { inner: Version::new(major, minor, patch) }
    }

    /// Parses a version string like `"1.2.3"`, `"1.2"` or `"1.0-beta.2"`.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(VersionError::Empty);
        }

        // Split the numeric core from any prerelease/build suffix so the
        // core can be padded out to three parts before strict parsing.
        let (core, suffix) = match raw.find(['-', '+']) {
            Some(at) => (&raw[..at], &raw[at..]),
            None => (raw, ""),
        };
        let full = match core.bytes().filter(|&b| b == b'.').count() {
            0 => format!("{core}.0.0{suffix}"),
            1 => format!("{core}.0{suffix}"),
            _ => format!("{core}{suffix}"),
        };

        let mut inner = Version::parse(&full).map_err(|e| VersionError::Invalid {
            raw: raw.to_string(),
            message: e.to_string(),
        })?;
        inner.build = BuildMetadata::EMPTY;
        Ok(Self { inner })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// The prerelease tag, if any (e.g. `"beta.2"` for `"1.0-beta.2"`).
    pub fn prerelease(&self) -> Option<&str> {
        if self.inner.pre.is_empty() {
            None
        } else {
            Some(self.inner.pre.as_str())
        }
    }

    /// Whether this is a prerelease version.
    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// Whether this version is strictly newer than the other.
    pub fn is_newer_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }

    /// Whether this version satisfies the given minimum version.
    pub fn is_at_least(&self, minimum: &SemanticVersion) -> bool {
        self >= minimum
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // semver's ordering already matches the contract: release beats
        // prerelease, prerelease segments compare numerically or lexically.
        self.inner.cmp(&other.inner)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticVersion::parse(s)
    }
}
