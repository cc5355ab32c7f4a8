// src/lib.rs

//! webarc: incremental web-archive assembly engine
//!
//! Composes a deployable directory tree from ordered content layers (project
//! resources, a source directory, overlay archives, dependency artifacts),
//! resolves dependency file-name collisions, and re-assembles incrementally
//! by diffing the current dependency set against the previous build's
//! persisted manifest.
//!
//! # Architecture
//!
//! - First-writer-wins: the earliest layer in precedence order to claim a
//!   path keeps it; the manifest records exactly one owner per path
//! - Collision renaming: duplicate artifact filenames are group-prefixed by
//!   a global scan, independent of iteration order
//! - Incremental diffing: dependency transitions are classified by conflict
//!   id and stale output files are deleted
//! - Single-threaded: the manifest is owned by one orchestrator run, no
//!   ambient state

pub mod assemble;
pub mod cli;
pub mod config;
pub mod coordinate;
mod error;
pub mod filter;
pub mod layer;
pub mod manifest;
pub mod naming;
pub mod packaging;
pub mod pathset;
pub mod persist;
pub mod unpack;

pub use assemble::{Assembly, AssemblyReport};
pub use coordinate::{ArtifactCoordinate, ArtifactKind, ResolvedArtifact, Scope};
pub use error::{Error, Result};
pub use layer::{Layer, LayerSource};
pub use manifest::{PathRegistration, WebappStructure};
pub use packaging::{analyse, ChangeEvent};
pub use pathset::PathSet;
pub use unpack::{TimestampCache, UnpackCache};
