// src/coordinate.rs

//! Dependency artifact coordinates.
//!
//! A coordinate identifies a dependency artifact for one build. The
//! `(group, name, kind)` triple is the conflict id: the stable key used to
//! match a dependency across builds independent of its version.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The kind of a dependency artifact.
///
/// Closed enumeration over the artifact types the engine understands, plus
/// `Other` for anything else. Unknown kinds are skipped with a logged notice,
/// never treated as an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Plain library archive, bundled under `lib/`
    Library,
    /// Test library archive, bundled under `lib/`
    TestLibrary,
    /// Tag/descriptor fragment, bundled under `tld/`
    DescriptorFragment,
    /// Service descriptor archive, bundled under `services/`
    ServiceDescriptor,
    /// Module archive, bundled under `modules/`
    ModuleArchive,
    /// Nested web archive; handled exclusively as an overlay layer
    WebArchive,
    /// Nested zip archive; handled exclusively as an overlay layer
    ZipArchive,
    /// Generated-code archive, bundled under `lib/`
    GeneratedCode,
    /// Anything the engine does not recognize
    Other(String),
}

impl ArtifactKind {
    /// Parse a kind from its conventional type string.
    pub fn from_type(s: &str) -> Self {
        match s {
            "jar" => Self::Library,
            "test-jar" => Self::TestLibrary,
            "tld" => Self::DescriptorFragment,
            "aar" => Self::ServiceDescriptor,
            "mar" => Self::ModuleArchive,
            "war" => Self::WebArchive,
            "zip" => Self::ZipArchive,
            "xar" => Self::GeneratedCode,
            other => Self::Other(other.to_string()),
        }
    }

    /// The file extension artifacts of this kind carry in the output tree.
    pub fn extension(&self) -> &str {
        match self {
            Self::Library | Self::TestLibrary | Self::GeneratedCode => "jar",
            Self::DescriptorFragment => "tld",
            Self::ServiceDescriptor => "aar",
            Self::ModuleArchive => "mar",
            Self::WebArchive => "war",
            Self::ZipArchive => "zip",
            Self::Other(ext) => ext,
        }
    }

    /// Whether this kind is consumed as an overlay layer instead of being
    /// copied by the artifact task.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::WebArchive | Self::ZipArchive)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Library => "jar",
            Self::TestLibrary => "test-jar",
            Self::DescriptorFragment => "tld",
            Self::ServiceDescriptor => "aar",
            Self::ModuleArchive => "mar",
            Self::WebArchive => "war",
            Self::ZipArchive => "zip",
            Self::GeneratedCode => "xar",
            Self::Other(s) => s,
        };
        write!(f, "{}", name)
    }
}

/// Dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Provided,
    Test,
}

impl Scope {
    /// Scopes whose artifacts are physically bundled into the output tree.
    pub fn is_bundled(&self) -> bool {
        matches!(self, Self::Compile | Self::Runtime)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
        };
        write!(f, "{}", name)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::Compile
    }
}

/// Coordinate of a dependency artifact, immutable for the duration of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub kind: ArtifactKind,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
}

impl ArtifactCoordinate {
    /// The `(group, name, kind)` key matching this dependency across builds.
    pub fn conflict_id(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.kind)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.kind)
    }
}

/// A dependency coordinate paired with its resolved local file.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub coordinate: ArtifactCoordinate,
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(group: &str, name: &str, kind: ArtifactKind) -> ArtifactCoordinate {
        ArtifactCoordinate {
            group: group.to_string(),
            name: name.to_string(),
            version: "1.0".to_string(),
            classifier: None,
            kind,
            scope: Scope::Compile,
            optional: false,
        }
    }

    #[test]
    fn test_kind_from_type() {
        assert_eq!(ArtifactKind::from_type("jar"), ArtifactKind::Library);
        assert_eq!(ArtifactKind::from_type("test-jar"), ArtifactKind::TestLibrary);
        assert_eq!(ArtifactKind::from_type("tld"), ArtifactKind::DescriptorFragment);
        assert_eq!(ArtifactKind::from_type("war"), ArtifactKind::WebArchive);
        assert_eq!(
            ArtifactKind::from_type("ejb3"),
            ArtifactKind::Other("ejb3".to_string())
        );
    }

    #[test]
    fn test_conflict_id_ignores_version() {
        let a = coord("g1", "util", ArtifactKind::Library);
        let mut b = a.clone();
        b.version = "2.0".to_string();
        assert_eq!(a.conflict_id(), b.conflict_id());
        assert_eq!(a.conflict_id(), "g1:util:jar");
    }

    #[test]
    fn test_conflict_id_distinguishes_kind() {
        let a = coord("g1", "util", ArtifactKind::Library);
        let b = coord("g1", "util", ArtifactKind::TestLibrary);
        assert_ne!(a.conflict_id(), b.conflict_id());
    }

    #[test]
    fn test_bundled_scopes() {
        assert!(Scope::Compile.is_bundled());
        assert!(Scope::Runtime.is_bundled());
        assert!(!Scope::Provided.is_bundled());
        assert!(!Scope::Test.is_bundled());
    }
}
