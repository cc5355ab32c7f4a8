// src/unpack.rs

//! Overlay archive extraction and the unpack freshness cache.
//!
//! Extraction handles the zip family (jar, war, zip, aar, mar) plus plain
//! and gzipped tarballs. Which archives need re-extraction between builds is
//! decided by an [`UnpackCache`]; the default implementation compares
//! filesystem timestamps.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

/// Extraction errors
#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("Failed to open archive {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read archive {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Archive entry escapes extraction root: {0}")]
    UnsafeEntry(String),

    #[error("Failed to extract {path} to {dest}: {source}")]
    Extract {
        path: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },

    #[error("Unsupported archive extension: {0}")]
    UnsupportedExtension(String),
}

/// Archive container formats the engine can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Zip container: jar, war, zip, aar, mar
    Zip,
    /// Gzipped tarball
    TarGz,
    /// Plain tarball
    Tar,
}

impl ArchiveFormat {
    /// Detect a format from the archive's file extension.
    pub fn from_path(path: &Path) -> Result<Self, UnpackError> {
        let name = path.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".tar") {
            Ok(Self::Tar)
        } else {
            match name.rsplit('.').next() {
                Some("jar") | Some("war") | Some("zip") | Some("aar") | Some("mar")
                | Some("xar") => Ok(Self::Zip),
                other => Err(UnpackError::UnsupportedExtension(
                    other.unwrap_or("").to_string(),
                )),
            }
        }
    }
}

/// Extract `archive` into `dest`, creating `dest` if necessary.
pub fn unpack(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    let format = ArchiveFormat::from_path(archive)?;
    fs::create_dir_all(dest).map_err(|e| UnpackError::Extract {
        path: archive.to_path_buf(),
        dest: dest.to_path_buf(),
        source: e,
    })?;
    match format {
        ArchiveFormat::Zip => unpack_zip(archive, dest),
        ArchiveFormat::TarGz => unpack_tar(archive, dest, true),
        ArchiveFormat::Tar => unpack_tar(archive, dest, false),
    }?;
    debug!("Unpacked {} to {}", archive.display(), dest.display());
    Ok(())
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file = File::open(archive_path).map_err(|e| UnpackError::Open {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| UnpackError::Read {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| UnpackError::Read {
            path: archive_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| UnpackError::UnsafeEntry(entry.name().to_string()))?;
        let target = dest.join(&relative);

        let extract_err = |e: io::Error| UnpackError::Extract {
            path: archive_path.to_path_buf(),
            dest: target.clone(),
            source: e,
        };

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(extract_err)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(extract_err)?;
        }
        let mut out = File::create(&target).map_err(extract_err)?;
        io::copy(&mut entry, &mut out).map_err(extract_err)?;
    }
    Ok(())
}

fn unpack_tar(archive_path: &Path, dest: &Path, gzipped: bool) -> Result<(), UnpackError> {
    let file = File::open(archive_path).map_err(|e| UnpackError::Open {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let result = if gzipped {
        tar::Archive::new(GzDecoder::new(reader)).unpack(dest)
    } else {
        tar::Archive::new(reader).unpack(dest)
    };
    result.map_err(|e| UnpackError::Extract {
        path: archive_path.to_path_buf(),
        dest: dest.to_path_buf(),
        source: e,
    })
}

/// Decides whether an overlay archive needs re-extraction into its work
/// directory.
pub trait UnpackCache {
    /// Ensure `archive` is extracted under `work_dir` and return the
    /// extraction directory.
    fn ensure_unpacked(&self, archive: &Path, work_dir: &Path) -> Result<PathBuf, UnpackError>;
}

/// Timestamp-based freshness cache.
///
/// Re-extracts when the work directory holds zero bytes or when the archive's
/// modification time is strictly newer than the directory's. This heuristic
/// assumes artifact files are replaced, not mutated in place, between builds;
/// clock skew or in-place mutation can produce stale reuse.
#[derive(Debug, Default)]
pub struct TimestampCache;

impl UnpackCache for TimestampCache {
    fn ensure_unpacked(&self, archive: &Path, work_dir: &Path) -> Result<PathBuf, UnpackError> {
        if needs_unpack(archive, work_dir) {
            info!(
                "Extracting overlay {} to {}",
                archive.display(),
                work_dir.display()
            );
            // Stale content from an older archive must not survive.
            if work_dir.exists() {
                fs::remove_dir_all(work_dir).map_err(|e| UnpackError::Extract {
                    path: archive.to_path_buf(),
                    dest: work_dir.to_path_buf(),
                    source: e,
                })?;
            }
            unpack(archive, work_dir)?;
        } else {
            debug!(
                "Overlay {} already extracted in {}",
                archive.display(),
                work_dir.display()
            );
        }
        Ok(work_dir.to_path_buf())
    }
}

fn needs_unpack(archive: &Path, work_dir: &Path) -> bool {
    if dir_total_bytes(work_dir) == 0 {
        return true;
    }
    match (mtime(archive), mtime(work_dir)) {
        (Some(archive_mtime), Some(dir_mtime)) => archive_mtime > dir_mtime,
        _ => true,
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn dir_total_bytes(dir: &Path) -> u64 {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("overlay.war")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("lib.jar")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("bundle.tar.gz")).unwrap(),
            ArchiveFormat::TarGz
        );
        assert!(ArchiveFormat::from_path(Path::new("readme.txt")).is_err());
    }

    #[test]
    fn test_unpack_zip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("overlay.war");
        write_zip(
            &archive,
            &[
                ("index.jsp", b"<html/>".as_slice()),
                ("WEB-INF/web.xml", b"<web-app/>".as_slice()),
            ],
        );

        let dest = dir.path().join("out");
        unpack(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("index.jsp")).unwrap(), b"<html/>");
        assert_eq!(fs::read(dest.join("WEB-INF/web.xml")).unwrap(), b"<web-app/>");
    }

    #[test]
    fn test_cache_skips_fresh_extraction() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("overlay.war");
        write_zip(&archive, &[("a.txt", b"one".as_slice())]);

        let work = dir.path().join("work");
        let cache = TimestampCache;
        cache.ensure_unpacked(&archive, &work).unwrap();

        // Plant a marker; a reused extraction keeps it.
        fs::write(work.join("marker"), "kept").unwrap();
        // Make the work dir newer than the archive.
        filetime::set_file_mtime(&work, filetime::FileTime::now()).unwrap();

        cache.ensure_unpacked(&archive, &work).unwrap();
        assert!(work.join("marker").exists());
    }

    #[test]
    fn test_cache_reextracts_newer_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("overlay.war");
        write_zip(&archive, &[("a.txt", b"one".as_slice())]);

        let work = dir.path().join("work");
        let cache = TimestampCache;
        cache.ensure_unpacked(&archive, &work).unwrap();
        fs::write(work.join("marker"), "stale").unwrap();

        // Replace the archive with a strictly newer one.
        write_zip(&archive, &[("b.txt", b"two".as_slice())]);
        let newer = filetime::FileTime::from_unix_time(
            filetime::FileTime::now().unix_seconds() + 10,
            0,
        );
        filetime::set_file_mtime(&archive, newer).unwrap();

        cache.ensure_unpacked(&archive, &work).unwrap();
        assert!(!work.join("marker").exists());
        assert!(work.join("b.txt").exists());
    }

    #[test]
    fn test_cache_extracts_into_empty_dir() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("overlay.zip");
        write_zip(&archive, &[("a.txt", b"one".as_slice())]);

        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();

        TimestampCache.ensure_unpacked(&archive, &work).unwrap();
        assert!(work.join("a.txt").exists());
    }
}
