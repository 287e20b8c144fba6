//! The constraint solver seam.
//!
//! Searching for a distinguisher is left to an external CP solver. This module only describes
//! what is handed to it (`CpModel`, `SolveParams`) and what comes back (`trail::SolverResult`).
//! `SolutionFile` is the shipped backend: it reads a solution the solver already produced, in
//! MiniZinc's JSON output layout.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use trail::{RoundConfig, SolverResult, Variant};

pub const SUPPORTED_CP_SOLVERS: [&str; 8] =
    ["gecode", "chuffed", "cbc", "gurobi", "picat", "scip", "choco", "ortools"];

/// Solvers deliver a solved variable assignment for a model instance.
pub trait Solver {
    fn solve(&self, model: &CpModel, params: &SolveParams) -> Result<SolverResult, SolveError>;
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("model is unsatisfiable")]
    Unsatisfiable,

    #[error("solving process was interrupted (status {status})")]
    Interrupted { status: String },

    #[error("unsupported CP solver '{0}'")]
    UnsupportedSolver(String),

    #[error("could not read solution {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode solution {path}: {source}")]
    Undecodable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A model instance: the model file plus the values of its integer parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpModel {
    model_file: String,
    config: RoundConfig,
}

/// Settings of one solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveParams {
    solver_name: String,
    num_of_threads: usize,
    time_limit: Option<Duration>,
}

/// Reads a precomputed solution from disk.
#[derive(Debug, Clone)]
pub struct SolutionFile {
    path: PathBuf,
}

/// The two layouts a solution file may have: MiniZinc's bare JSON solution, or the same solution
/// wrapped together with the final solver status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SolutionDocument {
    Envelope {
        status: String,
        #[serde(default)]
        solution: Option<SolverResult>,
    },
    Bare(SolverResult),
}

// =================================================================================================

impl CpModel {
    pub fn new(config: RoundConfig) -> Self {
        let model_file = match config.variant {
            Variant::Qarma64 => "distinguisherqarma64.mzn",
            Variant::Qarma128 => "distinguisherqarma128.mzn",
        };
        Self {
            model_file: model_file.to_string(),
            config,
        }
    }

    #[inline]
    pub fn model_file(&self) -> &str {
        &self.model_file
    }

    #[inline]
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// The integer parameters assigned to the model instance, by name.
    pub fn parameters(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("RU", self.config.ru),
            ("RL", self.config.rl),
            ("KR", self.config.kr),
            ("NPT", self.config.npt),
        ]
    }
}

impl SolveParams {
    /// `ortools` is resolved to the identifier of the OR-Tools build bundled with MiniZinc.
    pub fn new(solver_name: &str, num_of_threads: usize, time_limit: Option<Duration>)
               -> Result<Self, SolveError>
    {
        if !SUPPORTED_CP_SOLVERS.contains(&solver_name) {
            return Err(SolveError::UnsupportedSolver(solver_name.to_string()));
        }
        let solver_name = match solver_name {
            "ortools" => "com.google.ortools.sat",
            other => other,
        };
        Ok(Self {
            solver_name: solver_name.to_string(),
            num_of_threads,
            time_limit,
        })
    }

    #[inline]
    pub fn solver_name(&self) -> &str {
        &self.solver_name
    }

    #[inline]
    pub fn num_of_threads(&self) -> usize {
        self.num_of_threads
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            solver_name: "com.google.ortools.sat".to_string(),
            num_of_threads: 8,
            time_limit: Some(Duration::from_secs(4000)),
        }
    }
}

impl fmt::Display for SolveParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CP solver:       {}", self.solver_name)?;
        writeln!(f, "No. of threads:  {}", self.num_of_threads)?;
        match self.time_limit {
            Some(limit) => write!(f, "Time limit:      {}", limit.as_secs()),
            None => write!(f, "Time limit:      None"),
        }
    }
}

impl SolutionFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, content: &str) -> Result<SolverResult, SolveError> {
        let document: SolutionDocument = serde_json::from_str(content)
            .map_err(|source| SolveError::Undecodable { path: self.path.clone(), source })?;

        match document {
            SolutionDocument::Bare(result) => Ok(result),
            SolutionDocument::Envelope { status, solution } => {
                let solved = matches!(status.as_str(), "OPTIMAL_SOLUTION" | "SATISFIED" | "ALL_SOLUTIONS");
                if status == "UNSATISFIABLE" {
                    Err(SolveError::Unsatisfiable)
                } else if solved {
                    solution.ok_or(SolveError::Interrupted { status })
                } else {
                    Err(SolveError::Interrupted { status })
                }
            },
        }
    }
}

impl Solver for SolutionFile {
    fn solve(&self, model: &CpModel, params: &SolveParams) -> Result<SolverResult, SolveError> {
        let start = Instant::now();
        info!(model = model.model_file(), solver = params.solver_name(),
              path = %self.path.display(), "loading solution");

        let content = fs::read_to_string(&self.path)
            .map_err(|source| SolveError::Unreadable { path: self.path.clone(), source })?;
        let result = self.decode(&content)?;

        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "solution loaded");
        Ok(result)
    }
}
