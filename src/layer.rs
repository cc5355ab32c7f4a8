// src/layer.rs

//! Layer configuration model.
//!
//! A layer is an ordered content source contributing files to the output
//! tree: a plain directory (project resources, the source directory) or an
//! overlay archive that needs extraction first. Layers are processed strictly
//! in configured order; that order is the tie-break for all path collisions.

use std::path::PathBuf;

/// Excludes applied to an overlay when none are configured.
pub const DEFAULT_OVERLAY_EXCLUDES: &[&str] = &["META-INF/**"];

/// Layer id used for the project's own content.
pub const CURRENT_BUILD_ID: &str = "currentBuild";

/// Layer id used for the implicit dependency-artifact layer.
pub const ARTIFACTS_ID: &str = "artifacts";

/// Where a layer's files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// A plain directory, copied as-is.
    Directory(PathBuf),
    /// An archive artifact, extracted into the work directory first.
    Archive(PathBuf),
}

/// One ordered content source.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: String,
    pub source: LayerSource,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    /// Prefix under which the layer's paths land, e.g. `WEB-INF/classes`.
    pub target_prefix: Option<String>,
    /// Copy through the token filter.
    pub filtered: bool,
    /// Skip this layer entirely.
    pub skip: bool,
}

impl Layer {
    /// A directory-backed layer with no filtering.
    pub fn directory(id: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: LayerSource::Directory(directory.into()),
            includes: Vec::new(),
            excludes: Vec::new(),
            target_prefix: None,
            filtered: false,
            skip: false,
        }
    }

    /// An overlay layer backed by an archive artifact. Overlays default to
    /// excluding `META-INF/**`.
    pub fn overlay(id: impl Into<String>, archive: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: LayerSource::Archive(archive.into()),
            includes: Vec::new(),
            excludes: DEFAULT_OVERLAY_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            target_prefix: None,
            filtered: false,
            skip: false,
        }
    }

    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = includes;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn with_target_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.target_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    pub fn skipped(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Join a relative path with this layer's target prefix.
    pub fn target_path(&self, relative: &str) -> String {
        match &self.target_prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), relative),
            None => relative.to_string(),
        }
    }
}
