// src/packaging/analysis.rs

//! Dependency diff engine.
//!
//! Compares the current dependency set against the snapshot persisted by the
//! previous build, keyed by conflict id (group:name:kind, version ignored),
//! and deletes output files belonging to dependencies that are gone or no
//! longer bundled under their previous name.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::{PackagingContext, PackagingTask};
use crate::coordinate::ArtifactCoordinate;
use crate::error::Result;
use crate::naming::{provisional_file_name, target_subdirectory};

/// Classified change of one dependency between two builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Present in both builds with all fields equal.
    Unchanged { current: ArtifactCoordinate },
    /// Present only in the current build.
    New { current: ArtifactCoordinate },
    /// Present only in the previous build.
    Removed { previous: ArtifactCoordinate },
    /// Same conflict id, different version.
    UpdatedVersion {
        previous: ArtifactCoordinate,
        current: ArtifactCoordinate,
    },
    /// Same conflict id, different scope.
    UpdatedScope {
        previous: ArtifactCoordinate,
        current: ArtifactCoordinate,
    },
    /// Same conflict id, different optional flag.
    UpdatedOptional {
        previous: ArtifactCoordinate,
        current: ArtifactCoordinate,
    },
    /// Same conflict id, some other field differs.
    UpdatedUnknown {
        previous: ArtifactCoordinate,
        current: ArtifactCoordinate,
    },
}

impl ChangeEvent {
    /// Human-readable description for the event stream.
    pub fn description(&self) -> String {
        match self {
            Self::Unchanged { current } => format!("Dependency {} is unchanged", current),
            Self::New { current } => format!("New dependency {}", current),
            Self::Removed { previous } => format!("Dependency {} was removed", previous),
            Self::UpdatedVersion { previous, current } => format!(
                "Dependency {} updated version ({} -> {})",
                current, previous.version, current.version
            ),
            Self::UpdatedScope { previous, current } => format!(
                "Dependency {} updated scope ({} -> {})",
                current, previous.scope, current.scope
            ),
            Self::UpdatedOptional { previous, current } => format!(
                "Dependency {} updated optional flag ({} -> {})",
                current, previous.optional, current.optional
            ),
            Self::UpdatedUnknown { current, .. } => {
                format!("Dependency {} changed in an unclassified way", current)
            }
        }
    }

    /// The previous coordinate whose bundled file must be deleted, if the
    /// deletion policy applies to this event.
    fn stale_previous(&self) -> Option<&ArtifactCoordinate> {
        let previously_bundled =
            |p: &ArtifactCoordinate| p.scope.is_bundled() && !p.optional;
        match self {
            Self::Unchanged { .. } | Self::New { .. } => None,
            Self::Removed { previous }
            | Self::UpdatedVersion { previous, .. }
            | Self::UpdatedUnknown { previous, .. } => {
                previously_bundled(previous).then_some(previous)
            }
            Self::UpdatedScope { previous, current } => {
                (previously_bundled(previous) && !current.scope.is_bundled())
                    .then_some(previous)
            }
            Self::UpdatedOptional { previous, current } => {
                (previously_bundled(previous) && current.optional).then_some(previous)
            }
        }
    }
}

/// Classify every conflict id present in either dependency set.
pub fn analyse(
    current: &[ArtifactCoordinate],
    previous: &BTreeMap<String, ArtifactCoordinate>,
) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    let mut seen = std::collections::BTreeSet::new();

    for coordinate in current {
        let conflict_id = coordinate.conflict_id();
        seen.insert(conflict_id.clone());
        match previous.get(&conflict_id) {
            None => events.push(ChangeEvent::New {
                current: coordinate.clone(),
            }),
            Some(prev) if prev == coordinate => events.push(ChangeEvent::Unchanged {
                current: coordinate.clone(),
            }),
            Some(prev) if prev.version != coordinate.version => {
                events.push(ChangeEvent::UpdatedVersion {
                    previous: prev.clone(),
                    current: coordinate.clone(),
                })
            }
            Some(prev) if prev.scope != coordinate.scope => {
                events.push(ChangeEvent::UpdatedScope {
                    previous: prev.clone(),
                    current: coordinate.clone(),
                })
            }
            Some(prev) if prev.optional != coordinate.optional => {
                events.push(ChangeEvent::UpdatedOptional {
                    previous: prev.clone(),
                    current: coordinate.clone(),
                })
            }
            Some(prev) => events.push(ChangeEvent::UpdatedUnknown {
                previous: prev.clone(),
                current: coordinate.clone(),
            }),
        }
    }

    for (conflict_id, prev) in previous {
        if !seen.contains(conflict_id) {
            events.push(ChangeEvent::Removed {
                previous: prev.clone(),
            });
        }
    }

    events
}

/// Runs the diff pass after the layer tasks: classifies every dependency
/// transition and deletes stale output files.
pub struct DependencyDiffTask {
    current: Vec<ArtifactCoordinate>,
}

impl DependencyDiffTask {
    pub fn new(current: Vec<ArtifactCoordinate>) -> Self {
        Self { current }
    }

    /// Delete the file the previous build bundled for `previous`, looked up
    /// via the kind-specific subdirectory rule. A missing file is logged,
    /// not fatal.
    fn delete_stale(
        &self,
        ctx: &PackagingContext<'_>,
        previous: &ArtifactCoordinate,
        reason: &str,
    ) -> Result<()> {
        let Some(subdir) = target_subdirectory(&previous.kind) else {
            debug!(
                "Dependency {} was never bundled by the artifact layer, nothing to delete",
                previous
            );
            return Ok(());
        };
        let file_name = ctx
            .manifest
            .previous_target_name(&previous.conflict_id())
            .map(str::to_string)
            .unwrap_or_else(|| provisional_file_name(previous));
        let path = ctx.output_dir.join(subdir).join(&file_name);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!(
                "Deleted stale {}/{} ({})",
                subdir, file_name, reason
            );
        } else {
            warn!(
                "Stale file {}/{} was already missing ({})",
                subdir, file_name, reason
            );
        }
        Ok(())
    }
}

impl PackagingTask for DependencyDiffTask {
    fn name(&self) -> &str {
        "dependency-analysis"
    }

    fn perform(&self, ctx: &mut PackagingContext<'_>) -> Result<()> {
        let events = analyse(&self.current, ctx.manifest.previous_dependencies());
        for event in &events {
            match event {
                ChangeEvent::Unchanged { .. } => debug!("{}", event.description()),
                _ => info!("{}", event.description()),
            }
            if let Some(previous) = event.stale_previous() {
                self.delete_stale(ctx, previous, &event.description())?;
            }
        }
        ctx.manifest.snapshot_dependencies(self.current.iter());
        Ok(())
    }
}
