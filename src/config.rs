// src/config.rs

//! TOML assembly descriptor for the command-line front end.
//!
//! The descriptor names the output and work directories, the content layers
//! in their configured order, and the resolved dependency set. It is the
//! engine-facing equivalent of a build tool's plugin configuration; computing
//! the dependency set itself belongs to the caller.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::Assembly;
use crate::coordinate::{ArtifactCoordinate, ArtifactKind, ResolvedArtifact, Scope};
use crate::error::{Error, Result};
use crate::layer::Layer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AssemblyConfig {
    pub output_dir: PathBuf,
    pub work_dir: PathBuf,
    #[serde(default)]
    pub manifest_file: Option<PathBuf>,
    #[serde(default, rename = "resource")]
    pub resources: Vec<DirectoryLayerConfig>,
    #[serde(default)]
    pub source: Option<DirectoryLayerConfig>,
    #[serde(default, rename = "overlay")]
    pub overlays: Vec<OverlayConfig>,
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ArtifactConfig>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DirectoryLayerConfig {
    pub id: String,
    pub directory: PathBuf,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub target_prefix: Option<String>,
    #[serde(default)]
    pub filtered: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OverlayConfig {
    pub id: String,
    pub archive: PathBuf,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Option<Vec<String>>,
    #[serde(default)]
    pub target_prefix: Option<String>,
    #[serde(default)]
    pub filtered: bool,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArtifactConfig {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    /// Conventional type string, e.g. `jar`, `tld`, `war`.
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
    pub file: PathBuf,
}

fn default_type() -> String {
    "jar".to_string()
}

impl AssemblyConfig {
    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Turn the descriptor into a runnable assembly.
    pub fn into_assembly(self) -> Assembly {
        let resource_layers = self
            .resources
            .into_iter()
            .map(directory_layer)
            .collect();
        let source_layer = self.source.map(directory_layer);
        let overlays = self
            .overlays
            .into_iter()
            .map(|o| {
                let mut layer = Layer::overlay(o.id, o.archive)
                    .with_includes(o.includes)
                    .filtered(o.filtered)
                    .skipped(o.skip);
                if let Some(excludes) = o.excludes {
                    layer = layer.with_excludes(excludes);
                }
                if let Some(prefix) = o.target_prefix {
                    layer = layer.with_target_prefix(prefix);
                }
                layer
            })
            .collect();
        let artifacts = self
            .artifacts
            .into_iter()
            .map(|a| ResolvedArtifact {
                coordinate: ArtifactCoordinate {
                    group: a.group,
                    name: a.name,
                    version: a.version,
                    classifier: a.classifier,
                    kind: ArtifactKind::from_type(&a.kind),
                    scope: a.scope,
                    optional: a.optional,
                },
                file: a.file,
            })
            .collect();

        Assembly {
            output_dir: self.output_dir,
            work_dir: self.work_dir,
            manifest_file: self.manifest_file,
            resource_layers,
            source_layer,
            overlays,
            artifacts,
            filter_properties: self.properties,
        }
    }
}

fn directory_layer(config: DirectoryLayerConfig) -> Layer {
    let mut layer = Layer::directory(config.id, config.directory)
        .with_includes(config.includes)
        .with_excludes(config.excludes)
        .filtered(config.filtered);
    if let Some(prefix) = config.target_prefix {
        layer = layer.with_target_prefix(prefix);
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerSource;

    #[test]
    fn test_parse_descriptor() {
        let toml = r#"
            output-dir = "target/webapp"
            work-dir = "target/work"
            manifest-file = "target/work/webapp-manifest.json"

            [[resource]]
            id = "resources"
            directory = "src/main/resources"
            filtered = true

            [source]
            id = "currentBuild"
            directory = "src/main/webapp"

            [[overlay]]
            id = "overlay-a"
            archive = "deps/overlay-a.war"
            excludes = ["WEB-INF/web.xml"]

            [[artifact]]
            group = "g1"
            name = "util"
            version = "1.0"
            type = "jar"
            scope = "runtime"
            file = "deps/util-1.0.jar"

            [properties]
            "app.name" = "shop"
        "#;
        let config: AssemblyConfig = toml::from_str(toml).unwrap();
        let assembly = config.into_assembly();

        assert_eq!(assembly.resource_layers.len(), 1);
        assert!(assembly.resource_layers[0].filtered);
        assert!(assembly.source_layer.is_some());
        assert_eq!(assembly.overlays.len(), 1);
        assert_eq!(
            assembly.overlays[0].excludes,
            vec!["WEB-INF/web.xml".to_string()]
        );
        assert!(matches!(
            assembly.overlays[0].source,
            LayerSource::Archive(_)
        ));
        assert_eq!(assembly.artifacts.len(), 1);
        assert_eq!(assembly.artifacts[0].coordinate.kind, ArtifactKind::Library);
        assert_eq!(assembly.filter_properties["app.name"], "shop");
    }

    #[test]
    fn test_artifact_type_defaults_to_jar() {
        let toml = r#"
            output-dir = "out"
            work-dir = "work"

            [[artifact]]
            group = "g1"
            name = "util"
            version = "1.0"
            file = "util-1.0.jar"
        "#;
        let config: AssemblyConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.artifacts[0].kind, "jar");
    }
}
