// src/packaging/artifacts.rs

//! The implicit artifact layer.
//!
//! Copies every resolved dependency artifact that is not handled as an
//! overlay into its kind-specific subdirectory, after a single duplicate scan
//! over the full set resolves file-name collisions. Artifacts outside the
//! bundlable scopes, or flagged optional, are registered in the manifest for
//! target-name bookkeeping but never physically copied.

use std::path::PathBuf;
use tracing::{debug, info};

use super::{copy_file, log_layer_done, PackagingContext, PackagingTask};
use crate::coordinate::ResolvedArtifact;
use crate::error::Result;
use crate::layer::{Layer, ARTIFACTS_ID};
use crate::naming::{detect_duplicates, resolve_target, warn_second_order_collisions, TargetDisposition};

/// Materializes the resolved dependency set into the output tree.
pub struct ArtifactLayerTask {
    artifacts: Vec<ResolvedArtifact>,
    layer: Layer,
}

impl ArtifactLayerTask {
    pub fn new(artifacts: Vec<ResolvedArtifact>) -> Self {
        Self {
            artifacts,
            layer: Layer::directory(ARTIFACTS_ID, PathBuf::new()),
        }
    }
}

impl PackagingTask for ArtifactLayerTask {
    fn name(&self) -> &str {
        ARTIFACTS_ID
    }

    fn perform(&self, ctx: &mut PackagingContext<'_>) -> Result<()> {
        let coordinates: Vec<_> = self.artifacts.iter().map(|a| &a.coordinate).collect();
        let duplicates = detect_duplicates(coordinates.iter().copied());
        warn_second_order_collisions(coordinates.iter().copied());

        let mut copied = 0;
        for artifact in &self.artifacts {
            let coordinate = &artifact.coordinate;
            let target = match resolve_target(coordinate, &duplicates) {
                TargetDisposition::CopyTo(path) => path,
                TargetDisposition::Overlay => {
                    debug!(
                        "Artifact {} is handled as an overlay, not copied here",
                        coordinate
                    );
                    continue;
                }
                TargetDisposition::Unsupported => {
                    info!(
                        "Artifact {} has unsupported kind [{}], skipping",
                        coordinate, coordinate.kind
                    );
                    continue;
                }
            };

            let file_name = target.rsplit('/').next().unwrap_or(&target);
            ctx.manifest
                .record_target_name(&coordinate.conflict_id(), file_name);

            if coordinate.optional || !coordinate.scope.is_bundled() {
                debug!(
                    " - {} not bundled (scope {}, optional {})",
                    coordinate, coordinate.scope, coordinate.optional
                );
                continue;
            }

            copy_file(ctx, &self.layer, &artifact.file, &target)?;
            copied += 1;
        }
        log_layer_done(ARTIFACTS_ID, copied);
        Ok(())
    }
}
