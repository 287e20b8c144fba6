use tracing::trace;

use crate::error::TrailError;
use crate::solution::{Mask, RoundConfig, SolverResult};
use crate::state::TrailState;
use crate::tweak::{Parity, TweakAnnotator, TweakOverlay};

use super::RoundPropagator;

/// Everything drawn for one backward round of one trail instance, in drawing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackwardLane {
    pub before_inv_sbox: TrailState,
    /// Drawn at pre-permutation coordinates. Forward draws the permutation before the diffusion,
    /// backward draws the inverse diffusion before the inverse permutation, so the remap sits on
    /// the other layer.
    pub after_inv_diffusion: TrailState,
    pub after_inv_permute: TrailState,
    pub before_tweak_xor: TrailState,
    pub after_tweak_xor: TrailState,
    pub subtweakey: TweakOverlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackwardRound {
    /// Drawn round index, counted from the middle of the distinguisher outwards.
    pub round: usize,
    /// Round index into the solver's backward arrays, counted from the ciphertext end.
    pub solver_round: usize,
    pub parity: Parity,
    pub lanes: Vec<BackwardLane>,
}

/// Derives the bottom (EL) trail. The solver's backward arrays run from the ciphertext end
/// inwards, so drawn round `r` reads solver round `RL - r - 1`.
#[derive(Debug, Clone)]
pub struct BackwardPropagator<'a> {
    result: &'a SolverResult,
    annotator: &'a TweakAnnotator<'a>,
    config: RoundConfig,
}

impl<'a> BackwardPropagator<'a> {
    pub fn new(result: &'a SolverResult, annotator: &'a TweakAnnotator<'a>, config: RoundConfig) -> Self {
        Self {
            result,
            annotator,
            config,
        }
    }

    pub fn solver_round(&self, round: usize) -> Result<usize, TrailError> {
        self.config.rl
            .checked_sub(round + 1)
            .ok_or_else(|| TrailError::index("backward round", round, self.config.rl))
    }

    /// Absolute round of the tweak schedule used by drawn backward round `round`.
    #[inline]
    pub fn tweak_round(&self, round: usize) -> usize {
        self.config.ru + round
    }

    /// The ciphertext-side boundary state which terminates the diagram body.
    pub fn terminal_state(&self, instance: usize) -> Result<TrailState, TrailError> {
        self.result.state(Mask::BackwardX, 0, instance)
    }

    fn lane(&self, round: usize, s: usize, instance: usize, parity: Parity)
            -> Result<BackwardLane, TrailError>
    {
        let before_inv_sbox = self.result.state(Mask::BackwardX, s, instance)?;
        let tweak_xor_input = self.result.state(Mask::BackwardExx, s, instance)?;
        let after_inv_diffusion = tweak_xor_input.permuted()?;
        let after_inv_permute = tweak_xor_input;
        let before_tweak_xor = after_inv_permute;
        let after_tweak_xor = self.result.state(Mask::BackwardSbx, s, instance)?;
        let subtweakey = self.annotator.overlay(self.tweak_round(round), instance, parity,
                                                before_tweak_xor)?;

        Ok(BackwardLane {
            before_inv_sbox,
            after_inv_diffusion,
            after_inv_permute,
            before_tweak_xor,
            after_tweak_xor,
            subtweakey,
        })
    }
}

impl RoundPropagator for BackwardPropagator<'_> {
    type Round = BackwardRound;

    #[inline]
    fn nr_of_rounds(&self) -> usize {
        self.config.rl
    }

    /// The backward trail continues the absolute round counter of the forward trail.
    #[inline]
    fn parity(&self, round: usize) -> Parity {
        Parity::of(self.config.ru + round)
    }

    fn propagate(&self, round: usize) -> Result<BackwardRound, TrailError> {
        let solver_round = self.solver_round(round)?;
        let parity = self.parity(round);
        let lanes = (0..self.config.variant.instances())
            .map(|instance| self.lane(round, solver_round, instance, parity))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(round, solver_round, parity = parity.index(), "derived backward round");
        Ok(BackwardRound {
            round,
            solver_round,
            parity,
            lanes,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::ActivityLabel;
    use crate::permutation::CELL_PERMUTATION;
    use crate::solution::{ResultBuilder, Variant};

    fn config() -> RoundConfig {
        RoundConfig::new(Variant::Qarma128, 3, 3, 8)
    }

    #[test]
    fn drawn_rounds_read_the_solver_arrays_in_reverse() {
        let result = ResultBuilder::new(config())
            .label(Mask::BackwardX, 2, 1, 0, ActivityLabel::NonzeroFixed)
            .label(Mask::BackwardX, 0, 1, 1, ActivityLabel::NonzeroAny)
            .build();
        let annotator = TweakAnnotator::new(&result, Variant::Qarma128).unwrap();
        let backward = BackwardPropagator::new(&result, &annotator, config());

        let first = backward.propagate(0).unwrap();
        assert_eq!(first.solver_round, 2);
        assert_eq!(first.lanes[1].before_inv_sbox.active_cells(), vec![0]);
        assert!(first.lanes[0].before_inv_sbox.is_inactive());

        let last = backward.propagate(2).unwrap();
        assert_eq!(last.solver_round, 0);
        assert_eq!(last.lanes[1].before_inv_sbox, backward.terminal_state(1).unwrap());
    }

    #[test]
    fn inverse_diffusion_is_remapped_but_inverse_permutation_is_not() {
        let result = ResultBuilder::new(config())
            .label(Mask::BackwardExx, 1, 0, 3, ActivityLabel::Unknown)
            .label(Mask::BackwardSbx, 1, 0, 9, ActivityLabel::NonzeroAny)
            .build();
        let annotator = TweakAnnotator::new(&result, Variant::Qarma128).unwrap();
        let backward = BackwardPropagator::new(&result, &annotator, config());

        let round = backward.propagate(1).unwrap();
        let lane = &round.lanes[0];
        assert_eq!(lane.after_inv_permute.active_cells(), vec![3]);
        assert_eq!(lane.after_inv_diffusion.active_cells(), vec![CELL_PERMUTATION[3]]);
        assert_eq!(lane.before_tweak_xor, lane.after_inv_permute);
        assert_eq!(lane.after_tweak_xor.active_cells(), vec![9]);
        assert_eq!(lane.subtweakey.labels, lane.before_tweak_xor);
    }

    #[test]
    fn parity_continues_after_the_forward_trail() {
        let result = ResultBuilder::new(config()).build();
        let annotator = TweakAnnotator::new(&result, Variant::Qarma128).unwrap();
        let backward = BackwardPropagator::new(&result, &annotator, config());

        // RU = 3, so the first backward round is absolute round 3.
        assert_eq!(backward.parity(0), Parity::Odd);
        assert_eq!(backward.parity(1), Parity::Even);
        assert_eq!(backward.tweak_round(1), 4);
    }

    #[test]
    fn round_past_the_backward_trail_fails_fast() {
        let result = ResultBuilder::new(config()).build();
        let annotator = TweakAnnotator::new(&result, Variant::Qarma128).unwrap();
        let backward = BackwardPropagator::new(&result, &annotator, config());

        assert_eq!(backward.propagate(3).unwrap_err(),
                   TrailError::index("backward round", 3, 3));
    }
}
