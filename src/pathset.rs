// src/pathset.rs

//! Relative path sets with include/exclude pattern filtering.
//!
//! Paths are stored normalized: forward slashes, no leading separator. The
//! set iterates in lexicographic order so every pass over it is
//! deterministic.

use glob::Pattern;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::Result;

/// Include pattern applied when none are configured.
pub const DEFAULT_INCLUDES: &[&str] = &["**"];

/// Patterns always excluded when scanning a directory.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/.gitignore", "**/.DS_Store", "**/*~"];

/// An ordered set of relative path strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: BTreeSet<String>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a path to the internal form: forward slashes, no leading
    /// separator.
    fn normalize(path: &str) -> String {
        path.replace('\\', "/").trim_start_matches('/').to_string()
    }

    /// Add a path. Returns true if it was not already present.
    pub fn add(&mut self, path: &str) -> bool {
        self.paths.insert(Self::normalize(path))
    }

    pub fn add_all(&mut self, other: &PathSet) {
        for path in &other.paths {
            self.paths.insert(path.clone());
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&Self::normalize(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Scan `base_dir` for files matching the include patterns and not
    /// matching the exclude patterns. Empty includes fall back to
    /// [`DEFAULT_INCLUDES`]; the default excludes always apply.
    pub fn scan(base_dir: &Path, includes: &[String], excludes: &[String]) -> Result<Self> {
        let include_patterns = if includes.is_empty() {
            compile_patterns(DEFAULT_INCLUDES.iter().copied())
        } else {
            compile_patterns(includes.iter().map(String::as_str))
        };
        let mut exclude_patterns = compile_patterns(excludes.iter().map(String::as_str));
        exclude_patterns.extend(compile_patterns(DEFAULT_EXCLUDES.iter().copied()));

        let mut set = PathSet::new();
        for entry in WalkDir::new(base_dir).follow_links(false) {
            let entry = entry.map_err(|e| {
                crate::Error::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walkdir loop")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(base_dir)
                .expect("walkdir entry under its root");
            let relative = Self::normalize(&relative.to_string_lossy());
            if matches_any(&include_patterns, &relative) && !matches_any(&exclude_patterns, &relative)
            {
                set.paths.insert(relative);
            }
        }
        Ok(set)
    }
}

impl<'a> FromIterator<&'a str> for PathSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = PathSet::new();
        for path in iter {
            set.add(path);
        }
        set
    }
}

fn compile_patterns<'a>(patterns: impl Iterator<Item = &'a str>) -> Vec<Pattern> {
    patterns
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Ignoring invalid path pattern [{}]: {}", p, e);
                None
            }
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], path: &str) -> bool {
    patterns.iter().any(|p| p.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalization() {
        let mut set = PathSet::new();
        set.add("/WEB-INF/web.xml");
        assert!(set.contains("WEB-INF/web.xml"));
        assert!(set.contains("/WEB-INF/web.xml"));
        set.add("WEB-INF\\lib\\a.jar");
        assert!(set.contains("WEB-INF/lib/a.jar"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = PathSet::new();
        assert!(set.add("index.jsp"));
        assert!(!set.add("index.jsp"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let set: PathSet = ["b.txt", "a.txt", "c/d.txt"].into_iter().collect();
        let paths: Vec<&str> = set.iter().collect();
        assert_eq!(paths, vec!["a.txt", "b.txt", "c/d.txt"]);
    }

    #[test]
    fn test_scan_with_includes_and_excludes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("WEB-INF")).unwrap();
        fs::write(dir.path().join("index.jsp"), "jsp").unwrap();
        fs::write(dir.path().join("WEB-INF/web.xml"), "xml").unwrap();
        fs::write(dir.path().join("notes.txt"), "txt").unwrap();

        let all = PathSet::scan(dir.path(), &[], &[]).unwrap();
        assert_eq!(all.len(), 3);

        let xml_only =
            PathSet::scan(dir.path(), &strings(&["**/*.xml"]), &[]).unwrap();
        assert!(xml_only.contains("WEB-INF/web.xml"));
        assert_eq!(xml_only.len(), 1);

        let no_txt = PathSet::scan(dir.path(), &[], &strings(&["**/*.txt"])).unwrap();
        assert!(no_txt.contains("index.jsp"));
        assert!(!no_txt.contains("notes.txt"));
    }

    #[test]
    fn test_invalid_pattern_does_not_poison_valid_ones() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("WEB-INF")).unwrap();
        fs::write(dir.path().join("WEB-INF/web.xml"), "xml").unwrap();
        fs::write(dir.path().join("notes.txt"), "txt").unwrap();

        // "[" is not a valid pattern; the valid include must still apply.
        let set = PathSet::scan(dir.path(), &strings(&["**/*.xml", "["]), &[]).unwrap();
        assert!(set.contains("WEB-INF/web.xml"));
        assert_eq!(set.len(), 1);

        // An invalid exclude must not exclude everything.
        let set = PathSet::scan(dir.path(), &[], &strings(&["["])).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_scan_applies_default_excludes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "x").unwrap();
        fs::write(dir.path().join("kept.txt"), "x").unwrap();

        let set = PathSet::scan(dir.path(), &[], &[]).unwrap();
        assert!(set.contains("kept.txt"));
        assert!(!set.contains(".git/config"));
    }
}
