//! Orchestration around the `trail` core: obtaining solver results, naming distinguishers,
//! rendering their diagrams to TikZ and writing the output files, one at a time or as a batch.

pub mod batch;
pub mod distinguisher;
pub mod error;
pub mod logging;
pub mod progress;
pub mod render;
pub mod setup;
pub mod solver;

pub use distinguisher::{Distinguisher, DistinguisherId, Drawing};
pub use error::DrawError;
pub use render::{DiagramRenderer, TikzRenderer};
pub use setup::{OutFiles, Setup};
pub use solver::{CpModel, SolutionFile, SolveError, SolveParams, Solver};
