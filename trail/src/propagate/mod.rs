//! Round-by-round derivation of the drawn trail states.
//!
//! Both directions derive, per round and per trail instance, every state the diagram shows for
//! that round. Instances share the round index, the parity decision and the tweak permutation,
//! but their labels are read independently from the solver result.

pub use backward::{BackwardLane, BackwardPropagator, BackwardRound};
pub use forward::{ForwardLane, ForwardPropagator, ForwardRound};

use crate::error::TrailError;
use crate::tweak::Parity;

mod backward;
mod forward;

/// A direction of the trail which can be derived one round at a time.
pub trait RoundPropagator {
    type Round;

    /// Number of drawn rounds in this direction.
    fn nr_of_rounds(&self) -> usize;

    /// Parity used to pick the lazy set for drawn round `round`.
    fn parity(&self, round: usize) -> Parity;

    fn propagate(&self, round: usize) -> Result<Self::Round, TrailError>;

    /// All rounds, in drawing order. Stops at the first failure.
    fn propagate_all(&self) -> Result<Vec<Self::Round>, TrailError> {
        (0..self.nr_of_rounds())
            .map(|r| self.propagate(r))
            .collect()
    }
}
