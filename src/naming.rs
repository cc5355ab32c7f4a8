// src/naming.rs

//! Artifact target-name resolution and collision renaming.
//!
//! Every dependency artifact maps to a provisional filename of the form
//! `name-version[-classifier].extension`. A single scan over the full
//! artifact set finds provisional names produced by more than one artifact;
//! every colliding artifact is renamed by prefixing its group id. The rename
//! is applied uniformly, so it is idempotent and independent of iteration
//! order.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::coordinate::{ArtifactCoordinate, ArtifactKind};

/// Where an artifact's bytes end up in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDisposition {
    /// Copy under this relative path.
    CopyTo(String),
    /// Nested web/zip archive; handled as an overlay layer, never copied
    /// here.
    Overlay,
    /// Unrecognized kind; skipped with a notice.
    Unsupported,
}

/// Subdirectory an artifact kind is bundled under, if any.
pub fn target_subdirectory(kind: &ArtifactKind) -> Option<&'static str> {
    match kind {
        ArtifactKind::Library | ArtifactKind::TestLibrary | ArtifactKind::GeneratedCode => {
            Some("lib")
        }
        ArtifactKind::DescriptorFragment => Some("tld"),
        ArtifactKind::ServiceDescriptor => Some("services"),
        ArtifactKind::ModuleArchive => Some("modules"),
        ArtifactKind::WebArchive | ArtifactKind::ZipArchive => None,
        ArtifactKind::Other(_) => None,
    }
}

/// The provisional filename for an artifact:
/// `name-version[-classifier].extension`.
pub fn provisional_file_name(coordinate: &ArtifactCoordinate) -> String {
    match &coordinate.classifier {
        Some(classifier) if !classifier.is_empty() => format!(
            "{}-{}-{}.{}",
            coordinate.name,
            coordinate.version,
            classifier,
            coordinate.kind.extension()
        ),
        _ => format!(
            "{}-{}.{}",
            coordinate.name,
            coordinate.version,
            coordinate.kind.extension()
        ),
    }
}

/// Provisional filenames produced by more than one artifact in the set.
pub fn detect_duplicates<'a>(
    artifacts: impl IntoIterator<Item = &'a ArtifactCoordinate>,
) -> HashSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for coordinate in artifacts {
        *counts.entry(provisional_file_name(coordinate)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}

/// Resolve the final target filename for an artifact, given the duplicate
/// scan of the full set. Colliding names are prefixed with the group id.
pub fn resolve_file_name(
    coordinate: &ArtifactCoordinate,
    duplicates: &HashSet<String>,
) -> String {
    let provisional = provisional_file_name(coordinate);
    if duplicates.contains(&provisional) {
        let renamed = format!("{}-{}", coordinate.group, provisional);
        debug!(
            "Artifact {} collides on {}, renamed to {}",
            coordinate, provisional, renamed
        );
        renamed
    } else {
        provisional
    }
}

/// Resolve where an artifact lands in the output tree.
pub fn resolve_target(
    coordinate: &ArtifactCoordinate,
    duplicates: &HashSet<String>,
) -> TargetDisposition {
    if coordinate.kind.is_overlay() {
        return TargetDisposition::Overlay;
    }
    match target_subdirectory(&coordinate.kind) {
        Some(subdir) => {
            let file_name = resolve_file_name(coordinate, duplicates);
            TargetDisposition::CopyTo(format!("{}/{}", subdir, file_name))
        }
        None => TargetDisposition::Unsupported,
    }
}

/// Flag group-prefixed names that still collide after renaming. The naming
/// scheme cannot disambiguate such artifacts, so they are reported rather
/// than silently resolved.
pub fn warn_second_order_collisions<'a>(
    artifacts: impl IntoIterator<Item = &'a ArtifactCoordinate> + Clone,
) {
    let duplicates = detect_duplicates(artifacts.clone());
    let mut seen: HashMap<String, &ArtifactCoordinate> = HashMap::new();
    for coordinate in artifacts {
        let resolved = resolve_file_name(coordinate, &duplicates);
        if let Some(first) = seen.insert(resolved.clone(), coordinate) {
            warn!(
                "Artifacts {} and {} both resolve to {} even after group \
                 prefixing; one will shadow the other",
                first, coordinate, resolved
            );
        }
    }
}
