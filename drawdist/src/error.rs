use std::fmt::Error as FmtError;
use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

use trail::TrailError;

use crate::solver::SolveError;

/// Failures of the orchestration layer. Each one is local to the distinguisher being drawn.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    Trail(#[from] TrailError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: IoError },

    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: IoError },

    #[error("rendering failed: {0}")]
    Format(#[from] FmtError),

    /// The diagram lacks a slot the renderer needs.
    #[error("{block} has no {slot} slot")]
    IncompleteDiagram { block: String, slot: &'static str },

    #[error("{failed} of {total} solution file(s) could not be drawn")]
    BatchFailed { failed: usize, total: usize },

    /// Invalid command line or setup values.
    #[error("invalid setup: {0}")]
    Setup(String),
}

impl DrawError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: IoError) -> Self {
        DrawError::Write { path: path.into(), source }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: IoError) -> Self {
        DrawError::Read { path: path.into(), source }
    }
}
