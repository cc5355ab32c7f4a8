// src/manifest.rs

//! The webapp structure manifest.
//!
//! Tracks, for one build, which layer owns every materialized path and which
//! target filename every dependency artifact resolved to. It also carries the
//! dependency snapshot persisted by the previous build, which the diff engine
//! compares against the current dependency set.
//!
//! The manifest is owned exclusively by the orchestrator thread and passed by
//! `&mut` through the packaging tasks; there is no ambient state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coordinate::ArtifactCoordinate;

/// Outcome of registering a path for a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRegistration {
    /// The path was unknown and now belongs to the registering layer.
    Registered,
    /// The path already belongs to the registering layer (re-run of the same
    /// layer); the caller may refresh the file if the source is newer.
    AlreadyOwned,
    /// The path belongs to an earlier layer; the registering layer must not
    /// touch the file.
    Refused { owner: String },
}

/// Path ownership, artifact naming, and cross-build dependency snapshot.
///
/// Ownership and the target-name cache are rebuilt from scratch on every run;
/// the persisted copy of the previous run supplies the previous dependency
/// snapshot and target names for the diff pass, and the previous ownership
/// map for incremental copy-if-newer decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebappStructure {
    /// relative path -> id of the layer that first wrote it
    path_owner: BTreeMap<String, String>,

    /// conflict id -> target filename resolved during this build
    artifact_names: BTreeMap<String, String>,

    /// conflict id -> coordinate, snapshotted at the end of the build
    dependencies: BTreeMap<String, ArtifactCoordinate>,

    /// Previous build's dependency snapshot; empty on a clean build.
    #[serde(skip)]
    previous_dependencies: BTreeMap<String, ArtifactCoordinate>,

    /// Previous build's target-name cache, used to locate stale files.
    #[serde(skip)]
    previous_names: BTreeMap<String, String>,

    /// Previous build's ownership map, used to detect incremental re-copies.
    #[serde(skip)]
    previous_owner: BTreeMap<String, String>,
}

impl WebappStructure {
    /// Create an empty manifest for a clean build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manifest for an incremental build: ownership starts empty,
    /// the loaded manifest becomes the previous-build snapshot.
    pub fn with_previous(previous: WebappStructure) -> Self {
        Self {
            path_owner: BTreeMap::new(),
            artifact_names: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            previous_dependencies: previous.dependencies,
            previous_names: previous.artifact_names,
            previous_owner: previous.path_owner,
        }
    }

    /// Register `path` for `layer_id` under the first-writer-wins rule.
    pub fn register(&mut self, layer_id: &str, path: &str) -> PathRegistration {
        match self.path_owner.get(path) {
            None => {
                self.path_owner
                    .insert(path.to_string(), layer_id.to_string());
                PathRegistration::Registered
            }
            Some(owner) if owner == layer_id => PathRegistration::AlreadyOwned,
            Some(owner) => PathRegistration::Refused {
                owner: owner.clone(),
            },
        }
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.path_owner.contains_key(path)
    }

    pub fn owner(&self, path: &str) -> Option<&str> {
        self.path_owner.get(path).map(String::as_str)
    }

    /// Number of registered paths.
    pub fn registered_count(&self) -> usize {
        self.path_owner.len()
    }

    /// Cache the resolved target filename for an artifact. Repeated lookups
    /// for the same conflict id within one build return the first name.
    pub fn record_target_name(&mut self, conflict_id: &str, file_name: &str) {
        self.artifact_names
            .entry(conflict_id.to_string())
            .or_insert_with(|| file_name.to_string());
    }

    pub fn cached_target_name(&self, conflict_id: &str) -> Option<&str> {
        self.artifact_names.get(conflict_id).map(String::as_str)
    }

    /// Target filename the previous build recorded for this conflict id.
    pub fn previous_target_name(&self, conflict_id: &str) -> Option<&str> {
        self.previous_names.get(conflict_id).map(String::as_str)
    }

    /// Layer that owned `path` in the previous build, if any.
    pub fn previous_owner(&self, path: &str) -> Option<&str> {
        self.previous_owner.get(path).map(String::as_str)
    }

    /// The previous build's dependency snapshot, keyed by conflict id.
    pub fn previous_dependencies(&self) -> &BTreeMap<String, ArtifactCoordinate> {
        &self.previous_dependencies
    }

    /// Record the current dependency set as the snapshot persisted for the
    /// next build. Replaces any earlier snapshot wholesale, so dependencies
    /// removed this build drop out of the record.
    pub fn snapshot_dependencies<'a>(
        &mut self,
        current: impl IntoIterator<Item = &'a ArtifactCoordinate>,
    ) {
        self.dependencies = current
            .into_iter()
            .map(|c| (c.conflict_id(), c.clone()))
            .collect();
    }

    /// The dependency snapshot recorded for the next build.
    pub fn recorded_dependencies(&self) -> &BTreeMap<String, ArtifactCoordinate> {
        &self.dependencies
    }

    /// Iterate over `(path, owner)` pairs in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.path_owner
            .iter()
            .map(|(p, o)| (p.as_str(), o.as_str()))
    }
}
