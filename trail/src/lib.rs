//! Trail-state model of integral/zero-correlation distinguishers on QARMA-v2.
//!
//! Given the solved variable assignment of the distinguisher search, this crate derives the
//! activity label of every cell at every operation boundary of the forward (EU) and backward (EL)
//! trails, frames the lazy tweak cells, and assembles everything into a renderer-agnostic
//! [`Diagram`]. Rendering a solver result is a pure function of that result and the round layout;
//! nothing here performs I/O.

pub use assemble::{assemble, TrailAssembler};
pub use diagram::{Block, BlockKind, CellMark, Diagram, DisplayDiagram, LaneCells, Slot};
pub use error::TrailError;
pub use label::{style, ActivityLabel, Style};
pub use solution::{Mask, ResultBuilder, RoundConfig, SolverResult, Variant};
pub use state::TrailState;
pub use tweak::{LazyCells, Parity, TweakAnnotator, TweakOverlay};

pub mod assemble;
pub mod diagram;
pub mod error;
pub mod label;
pub mod permutation;
pub mod propagate;
pub mod solution;
pub mod state;
pub mod summary;
pub mod tweak;
