//! Draws every solution file of a folder. Rendering passes share nothing, so they run in
//! parallel; a failing file is reported and the others carry on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::distinguisher::{Distinguisher, DistinguisherId};
use crate::error::DrawError;
use crate::progress::{MyStyledProgressBar, StyledProgressBar};
use crate::render::DiagramRenderer;
use crate::setup::{OutFiles, Setup};
use crate::solver::{SolutionFile, SolveParams};

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written distinguishers, in file order.
    pub drawn: Vec<(PathBuf, DistinguisherId)>,
    pub failed: Vec<(PathBuf, DrawError)>,
}

impl BatchReport {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drawn.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `*.json` files directly inside `folder`, sorted by path.
pub fn solution_files<P: AsRef<Path>>(folder: P) -> Result<Vec<PathBuf>, DrawError> {
    let folder = folder.as_ref();
    let entries = fs::read_dir(folder).map_err(|e| DrawError::read(folder, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DrawError::read(folder, e))?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Draws every solution file in `in_folder` with the round layout of `setup`, writing the
/// results to `out_folder`. File number `i` in sorted order becomes distinguisher `i + 1`.
pub fn draw_batch<R>(setup: &Setup,
                     in_folder: &Path,
                     out_folder: &Path,
                     params: &SolveParams,
                     renderer: &R,
                     progress: Option<&MyStyledProgressBar>)
                     -> Result<BatchReport, DrawError>
    where
        R: DiagramRenderer + Sync,
{
    let files = solution_files(in_folder)?;
    info!(files = files.len(), folder = %in_folder.display(), "drawing batch");

    let outcomes: Vec<_> = files.into_par_iter()
        .enumerate()
        .map(|(i, path)| {
            let id = DistinguisherId::new(i + 1);
            let name = path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("distinguisher{}", id));
            let distinguisher = Distinguisher::new(
                id, setup.with_out_files(OutFiles::in_folder(out_folder, &name)));

            let outcome = distinguisher.run(&SolutionFile::new(&path), params, renderer);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            (path, id, outcome)
        })
        .collect();

    let mut report = BatchReport::default();
    for (path, id, outcome) in outcomes {
        match outcome {
            Ok(_) => report.drawn.push((path, id)),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not draw distinguisher");
                report.failed.push((path, e));
            }
        }
    }
    Ok(report)
}
