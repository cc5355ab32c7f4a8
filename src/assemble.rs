// src/assemble.rs

//! The assembly orchestrator.
//!
//! Runs the packaging tasks in the fixed precedence order, then the
//! dependency diff pass, then persists the manifest. A failing layer aborts
//! the remaining layers and leaves partially-written output in place: the
//! next run repairs it through first-writer-wins and the diff pass, starting
//! from the last successfully persisted manifest.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::error::Result;
use crate::filter::ContentFilter;
use crate::layer::Layer;
use crate::manifest::WebappStructure;
use crate::coordinate::ResolvedArtifact;
use crate::packaging::{
    ArtifactLayerTask, DependencyDiffTask, OverlayLayerTask, PackagingContext, PackagingTask,
    ProjectLayerTask,
};
use crate::persist;
use crate::unpack::{TimestampCache, UnpackCache};

/// Everything one assembly run needs.
///
/// Layer precedence is fixed: resource layers in their configured order, then
/// the source layer, then overlays in their configured order, then the
/// implicit artifact layer.
pub struct Assembly {
    /// Root of the assembled output tree.
    pub output_dir: PathBuf,
    /// Scratch directory for overlay extraction.
    pub work_dir: PathBuf,
    /// Manifest location; `None` disables incremental state entirely.
    pub manifest_file: Option<PathBuf>,
    /// Project resource layers.
    pub resource_layers: Vec<Layer>,
    /// The project's own source/classes layer.
    pub source_layer: Option<Layer>,
    /// Overlay layers.
    pub overlays: Vec<Layer>,
    /// The resolved dependency set.
    pub artifacts: Vec<ResolvedArtifact>,
    /// Properties for filtered copies.
    pub filter_properties: BTreeMap<String, String>,
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct AssemblyReport {
    /// Number of layer tasks executed.
    pub layers: usize,
    /// Paths registered in the manifest.
    pub registered_paths: usize,
}

impl Assembly {
    /// Run the assembly with the default timestamp-based unpack cache.
    pub fn run(&self) -> Result<AssemblyReport> {
        self.run_with_cache(&TimestampCache)
    }

    /// Run the assembly with a caller-supplied unpack cache.
    pub fn run_with_cache(&self, unpack_cache: &dyn UnpackCache) -> Result<AssemblyReport> {
        let start = Instant::now();
        info!("Assembling webapp in [{}]", self.output_dir.display());

        let mut manifest = match &self.manifest_file {
            Some(file) => WebappStructure::with_previous(persist::load(file)),
            None => WebappStructure::new(),
        };
        let filter = ContentFilter::new(self.filter_properties.clone());

        std::fs::create_dir_all(&self.output_dir)?;

        let mut tasks: Vec<Box<dyn PackagingTask>> = Vec::new();
        for layer in &self.resource_layers {
            tasks.push(Box::new(ProjectLayerTask::new(layer.clone())));
        }
        if let Some(source) = &self.source_layer {
            tasks.push(Box::new(ProjectLayerTask::new(source.clone())));
        }
        for overlay in &self.overlays {
            tasks.push(Box::new(OverlayLayerTask::new(overlay.clone())));
        }
        tasks.push(Box::new(ArtifactLayerTask::new(self.artifacts.clone())));
        let layer_count = tasks.len();

        // The diff pass runs after every layer, per orchestrator contract.
        tasks.push(Box::new(DependencyDiffTask::new(
            self.artifacts.iter().map(|a| a.coordinate.clone()).collect(),
        )));

        let mut ctx = PackagingContext {
            output_dir: &self.output_dir,
            work_dir: &self.work_dir,
            manifest: &mut manifest,
            filter: &filter,
            unpack_cache,
        };
        for task in &tasks {
            task.perform(&mut ctx)?;
        }

        if let Some(file) = &self.manifest_file {
            persist::save(&manifest, file)?;
        }

        let report = AssemblyReport {
            layers: layer_count,
            registered_paths: manifest.registered_count(),
        };
        info!(
            "Webapp assembled in [{} ms] ({} layers, {} paths)",
            start.elapsed().as_millis(),
            report.layers,
            report.registered_paths
        );
        Ok(report)
    }
}
