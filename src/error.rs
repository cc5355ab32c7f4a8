// src/error.rs

//! Crate-wide error type for the assembly engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::unpack::UnpackError;

/// Errors surfaced by the assembly engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Unpack(#[from] UnpackError),

    #[error("Failed to write manifest {path}: {reason}")]
    ManifestWrite { path: PathBuf, reason: String },

    #[error("Overlay source does not exist: {0}")]
    MissingOverlaySource(PathBuf),

    #[error("Layer source directory does not exist: {0}")]
    MissingSourceDirectory(PathBuf),

    #[error("Failed to read assembly config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
