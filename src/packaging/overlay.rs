// src/packaging/overlay.rs

//! Packaging task for overlay layers.
//!
//! An overlay's content originates from extracting an archive artifact. The
//! unpack cache decides whether the archive needs re-extraction; the
//! extracted tree is then filtered and copied like any other layer, still
//! subject to first-writer-wins.

use tracing::{debug, info};

use super::{copy_files, log_layer_done, PackagingContext, PackagingTask};
use crate::error::{Error, Result};
use crate::layer::{Layer, LayerSource};
use crate::pathset::PathSet;

/// Materializes one overlay archive into the output tree.
pub struct OverlayLayerTask {
    layer: Layer,
}

impl OverlayLayerTask {
    pub fn new(layer: Layer) -> Self {
        Self { layer }
    }

    /// Work subdirectory for this overlay's extraction, derived from the
    /// layer id so overlays never share extraction state.
    fn work_subdir(&self) -> String {
        self.layer
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            })
            .collect()
    }
}

impl PackagingTask for OverlayLayerTask {
    fn name(&self) -> &str {
        &self.layer.id
    }

    fn perform(&self, ctx: &mut PackagingContext<'_>) -> Result<()> {
        if self.layer.skip {
            info!("Skipping overlay [{}]", self.layer.id);
            return Ok(());
        }
        let archive = match &self.layer.source {
            LayerSource::Archive(archive) => archive,
            LayerSource::Directory(dir) => {
                return Err(Error::MissingOverlaySource(dir.clone()));
            }
        };
        if !archive.is_file() {
            return Err(Error::MissingOverlaySource(archive.clone()));
        }

        let work_dir = ctx.work_dir.join(self.work_subdir());
        let extracted = ctx.unpack_cache.ensure_unpacked(archive, &work_dir)?;
        debug!(
            "Overlay [{}] content at {}",
            self.layer.id,
            extracted.display()
        );

        let paths = PathSet::scan(&extracted, &self.layer.includes, &self.layer.excludes)?;
        copy_files(ctx, &self.layer, &extracted, &paths)?;
        log_layer_done(&self.layer.id, paths.len());
        Ok(())
    }
}
