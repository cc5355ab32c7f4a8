// src/packaging/project.rs

//! Packaging task for directory-backed project layers: web resources and the
//! project's own source/classes directory.

use tracing::debug;

use super::{copy_files, log_layer_done, PackagingContext, PackagingTask};
use crate::error::{Error, Result};
use crate::layer::{Layer, LayerSource};
use crate::pathset::PathSet;

/// Materializes one directory-backed layer into the output tree.
pub struct ProjectLayerTask {
    layer: Layer,
    /// A missing source directory is an error for mandatory layers and a
    /// no-op for optional ones (a project without resources is fine).
    required: bool,
}

impl ProjectLayerTask {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl PackagingTask for ProjectLayerTask {
    fn name(&self) -> &str {
        &self.layer.id
    }

    fn perform(&self, ctx: &mut PackagingContext<'_>) -> Result<()> {
        if self.layer.skip {
            debug!("Layer [{}] is skipped", self.layer.id);
            return Ok(());
        }
        let directory = match &self.layer.source {
            LayerSource::Directory(dir) => dir,
            LayerSource::Archive(archive) => {
                // Misconfiguration; archives belong to the overlay task.
                return Err(Error::MissingSourceDirectory(archive.clone()));
            }
        };
        if !directory.is_dir() {
            if self.required {
                return Err(Error::MissingSourceDirectory(directory.clone()));
            }
            debug!(
                "Layer [{}] has no source directory at {}, nothing to do",
                self.layer.id,
                directory.display()
            );
            return Ok(());
        }

        let paths = PathSet::scan(directory, &self.layer.includes, &self.layer.excludes)?;
        copy_files(ctx, &self.layer, directory, &paths)?;
        log_layer_done(&self.layer.id, paths.len());
        Ok(())
    }
}
