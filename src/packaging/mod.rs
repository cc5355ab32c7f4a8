// src/packaging/mod.rs

//! Layer packaging tasks and the first-writer-wins copy protocol.
//!
//! Each content source (project resources, source directory, overlay
//! archives, dependency artifacts) is materialized by one task. Tasks run in
//! the precedence order fixed by the orchestrator; the shared copy protocol
//! consults the manifest so that the first layer to claim a path keeps it.

mod analysis;
mod artifacts;
mod overlay;
mod project;

pub use analysis::{analyse, ChangeEvent, DependencyDiffTask};
pub use artifacts::ArtifactLayerTask;
pub use overlay::OverlayLayerTask;
pub use project::ProjectLayerTask;

use filetime::FileTime;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::filter::ContentFilter;
use crate::layer::Layer;
use crate::manifest::{PathRegistration, WebappStructure};
use crate::pathset::PathSet;
use crate::unpack::UnpackCache;

/// Shared state threaded through every packaging task for one build.
pub struct PackagingContext<'a> {
    /// Root of the assembled output tree.
    pub output_dir: &'a Path,
    /// Scratch directory for overlay extraction.
    pub work_dir: &'a Path,
    /// The single-owner manifest, mutated by every task.
    pub manifest: &'a mut WebappStructure,
    /// Token filter for layers flagged `filtered`.
    pub filter: &'a ContentFilter,
    /// Freshness policy for overlay extraction.
    pub unpack_cache: &'a dyn UnpackCache,
}

/// One packaging step executed by the orchestrator.
pub trait PackagingTask {
    /// Identifier used in logs and errors.
    fn name(&self) -> &str;

    fn perform(&self, ctx: &mut PackagingContext<'_>) -> Result<()>;
}

/// Copy every path in `paths` from `base_dir` into the output tree under the
/// layer's target prefix, subject to first-writer-wins.
pub(crate) fn copy_files(
    ctx: &mut PackagingContext<'_>,
    layer: &Layer,
    base_dir: &Path,
    paths: &PathSet,
) -> Result<()> {
    for relative in paths.iter() {
        let source = base_dir.join(relative);
        let target_name = layer.target_path(relative);
        copy_file(ctx, layer, &source, &target_name)?;
    }
    Ok(())
}

/// Copy a single file under the first-writer-wins rule.
///
/// A path already owned by an earlier layer is skipped and logged. A path the
/// same layer owned in the previous build, or re-registers within this one,
/// is refreshed only if the source is strictly newer than the destination.
pub(crate) fn copy_file(
    ctx: &mut PackagingContext<'_>,
    layer: &Layer,
    source: &Path,
    target_name: &str,
) -> Result<()> {
    match ctx.manifest.register(&layer.id, target_name) {
        PathRegistration::Registered => {
            let retained = ctx.manifest.previous_owner(target_name) == Some(layer.id.as_str());
            if write_file(ctx, layer, source, target_name, retained)? {
                debug!(" + {} has been copied", target_name);
            } else {
                debug!(" * {} is up to date", target_name);
            }
        }
        PathRegistration::AlreadyOwned => {
            if write_file(ctx, layer, source, target_name, true)? {
                debug!(" + {} has been refreshed", target_name);
            } else {
                debug!(" * {} is up to date", target_name);
            }
        }
        PathRegistration::Refused { owner } => {
            debug!(
                " - {} wasn't copied because it has already been packaged for [{}]",
                target_name, owner
            );
        }
    }
    Ok(())
}

/// Write `source` to the output tree at `target_name`, preserving the
/// source's modification timestamp. With `only_if_newer`, an up-to-date
/// destination is left alone; returns whether bytes were written.
fn write_file(
    ctx: &PackagingContext<'_>,
    layer: &Layer,
    source: &Path,
    target_name: &str,
    only_if_newer: bool,
) -> Result<bool> {
    let destination = ctx.output_dir.join(target_name);

    if only_if_newer && !is_newer(source, &destination) {
        return Ok(false);
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Copy {
            path: destination.clone(),
            source: e,
        })?;
    }

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if layer.filtered && ctx.filter.is_filterable(&file_name) {
        let content = fs::read_to_string(source).map_err(|e| Error::Copy {
            path: source.to_path_buf(),
            source: e,
        })?;
        fs::write(&destination, ctx.filter.apply(&content)).map_err(|e| Error::Copy {
            path: destination.clone(),
            source: e,
        })?;
    } else {
        fs::copy(source, &destination).map_err(|e| Error::Copy {
            path: source.to_path_buf(),
            source: e,
        })?;
        preserve_mtime(source, &destination)?;
    }
    Ok(true)
}

fn is_newer(source: &Path, destination: &Path) -> bool {
    let source_mtime = fs::metadata(source).and_then(|m| m.modified()).ok();
    let dest_mtime = fs::metadata(destination).and_then(|m| m.modified()).ok();
    match (source_mtime, dest_mtime) {
        (Some(s), Some(d)) => s > d,
        _ => true,
    }
}

fn preserve_mtime(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| Error::Copy {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(destination, mtime).map_err(|e| Error::Copy {
        path: destination.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Log the summary line for a finished layer.
pub(crate) fn log_layer_done(layer_id: &str, copied: usize) {
    info!("Layer [{}] packaged ({} paths considered)", layer_id, copied);
}
