//! Canonical IDB version identifiers
//!
//! Every public operation accepts the informal label forms (`"2.26.34"`,
//! `"v2.26.34"`, `"2-26-34"`, `(2, 26, 34)`) and converts them to a
//! [`VersionId`] right at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::idb::error::InvalidVersionLabel;

/// Prefix of a version directory inside the catalog root
pub const VERSION_DIR_PREFIX: &str = "v";

/// Semantic version triple identifying one IDB release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionId {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Name of the directory holding this version (e.g. `v2.26.34`)
    pub fn dir_name(&self) -> String {
        format!("{}{}", VERSION_DIR_PREFIX, self)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionId {
    type Err = InvalidVersionLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s).ok_or_else(|| InvalidVersionLabel(s.to_string()))
    }
}

impl TryFrom<String> for VersionId {
    type Error = InvalidVersionLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.to_string()
    }
}

impl From<(u64, u64, u64)> for VersionId {
    fn from((major, minor, patch): (u64, u64, u64)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl From<VersionId> for semver::Version {
    fn from(value: VersionId) -> Self {
        semver::Version::new(value.major, value.minor, value.patch)
    }
}

/// Parse a version label into a [`VersionId`].
///
/// Strips an optional `v`/`V` prefix and accepts `.`, `-` or `_` as component
/// separators. Exactly three components are required and pre-release or build
/// metadata is rejected.
///
/// Components with leading zeros (`2.26.03`) are rejected rather than read as
/// `2.26.3`, so every accepted label maps back to exactly one directory name.
///
/// Examples:
/// - "2.26.34" -> VersionId(2, 26, 34)
/// - "v2.26.34" -> VersionId(2, 26, 34)
/// - "2-26-34" -> VersionId(2, 26, 34)
/// - "2.26" -> None
pub fn parse_label(label: &str) -> Option<VersionId> {
    let trimmed = label.trim();
    let stripped = trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed)
        .replace(['-', '_'], ".");

    let version = semver::Version::parse(&stripped).ok()?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return None;
    }

    Some(VersionId::new(version.major, version.minor, version.patch))
}

/// Anything that can name an IDB version at the public boundary
pub trait VersionLike {
    /// Normalize into a [`VersionId`], or `None` if the input is unparsable
    fn to_version_id(&self) -> Option<VersionId>;

    /// The label as the caller spelled it, used in error messages
    fn label(&self) -> String;
}

impl VersionLike for VersionId {
    fn to_version_id(&self) -> Option<VersionId> {
        Some(*self)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl VersionLike for str {
    fn to_version_id(&self) -> Option<VersionId> {
        parse_label(self)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl VersionLike for String {
    fn to_version_id(&self) -> Option<VersionId> {
        parse_label(self)
    }

    fn label(&self) -> String {
        self.clone()
    }
}

impl VersionLike for (u64, u64, u64) {
    fn to_version_id(&self) -> Option<VersionId> {
        Some(VersionId::from(*self))
    }

    fn label(&self) -> String {
        format!("({}, {}, {})", self.0, self.1, self.2)
    }
}

impl<T: VersionLike + ?Sized> VersionLike for &T {
    fn to_version_id(&self) -> Option<VersionId> {
        (**self).to_version_id()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}
