// src/persist.rs

//! Manifest persistence.
//!
//! The manifest is stored as pretty-printed JSON next to the work directory.
//! A missing file means "first build"; an unreadable or corrupt file degrades
//! to clean-build behavior with a warning instead of failing the run.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::manifest::WebappStructure;

/// Load the manifest persisted by the previous build.
///
/// Returns an empty manifest when the file does not exist or cannot be
/// parsed.
pub fn load(path: &Path) -> WebappStructure {
    if !path.exists() {
        debug!("No manifest at {}, starting clean", path.display());
        return WebappStructure::new();
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(
                    "Manifest {} is corrupt ({}), falling back to a clean build",
                    path.display(),
                    e
                );
                WebappStructure::new()
            }
        },
        Err(e) => {
            warn!(
                "Could not read manifest {} ({}), falling back to a clean build",
                path.display(),
                e
            );
            WebappStructure::new()
        }
    }
}

/// Persist the manifest for the next build.
pub fn save(manifest: &WebappStructure, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest).map_err(|e| Error::ManifestWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, json)?;
    debug!("Saved manifest to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::{ArtifactCoordinate, ArtifactKind, Scope};
    use tempfile::TempDir;

    fn coord(name: &str, version: &str) -> ArtifactCoordinate {
        ArtifactCoordinate {
            group: "g1".to_string(),
            name: name.to_string(),
            version: version.to_string(),
            classifier: None,
            kind: ArtifactKind::Library,
            scope: Scope::Runtime,
            optional: false,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("work/webapp-manifest.json");

        let mut manifest = WebappStructure::new();
        manifest.register("resources", "WEB-INF/web.xml");
        manifest.register("overlay-a", "index.jsp");
        manifest.record_target_name("g1:lib:jar", "lib-1.0.jar");
        manifest.snapshot_dependencies([&coord("lib", "1.0")]);

        save(&manifest, &file).unwrap();
        let loaded = load(&file);

        assert_eq!(loaded.owner("WEB-INF/web.xml"), Some("resources"));
        assert_eq!(loaded.owner("index.jsp"), Some("overlay-a"));
        assert_eq!(loaded.cached_target_name("g1:lib:jar"), Some("lib-1.0.jar"));
        assert_eq!(
            loaded.recorded_dependencies(),
            manifest.recorded_dependencies()
        );
    }

    #[test]
    fn test_load_missing_file_is_clean_build() {
        let dir = TempDir::new().unwrap();
        let manifest = load(&dir.path().join("absent.json"));
        assert_eq!(manifest.registered_count(), 0);
        assert!(manifest.previous_dependencies().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_clean_build() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("manifest.json");
        std::fs::write(&file, "{ not json").unwrap();
        let manifest = load(&file);
        assert_eq!(manifest.registered_count(), 0);
    }
}
