use tracing::trace;

use crate::error::TrailError;
use crate::solution::{Mask, RoundConfig, SolverResult};
use crate::state::TrailState;
use crate::tweak::{Parity, TweakAnnotator, TweakOverlay};

use super::RoundPropagator;

/// Everything drawn for one forward round of one trail instance, in cipher order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardLane {
    pub before_sbox: TrailState,
    pub after_sbox: TrailState,
    pub after_tweak_xor: TrailState,
    /// Drawn at post-permutation coordinates.
    pub after_permute: TrailState,
    /// Equal to the state entering the next round.
    pub after_diffusion: TrailState,
    pub subtweakey: TweakOverlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRound {
    pub round: usize,
    pub parity: Parity,
    /// One entry per trail instance.
    pub lanes: Vec<ForwardLane>,
}

/// Derives the top (EU) trail.
#[derive(Debug, Clone)]
pub struct ForwardPropagator<'a> {
    result: &'a SolverResult,
    annotator: &'a TweakAnnotator<'a>,
    config: RoundConfig,
}

impl<'a> ForwardPropagator<'a> {
    pub fn new(result: &'a SolverResult, annotator: &'a TweakAnnotator<'a>, config: RoundConfig) -> Self {
        Self {
            result,
            annotator,
            config,
        }
    }

    /// The plaintext-side state the diagram opens with.
    pub fn initial_state(&self, instance: usize) -> Result<TrailState, TrailError> {
        self.result.state(Mask::ForwardX, 0, instance)
    }

    fn lane(&self, r: usize, instance: usize, parity: Parity) -> Result<ForwardLane, TrailError> {
        let before_sbox = self.result.state(Mask::ForwardX, r, instance)?;
        let after_sbox = self.result.state(Mask::ForwardSbx, r, instance)?;
        let after_tweak_xor = self.result.state(Mask::ForwardExx, r, instance)?;
        // The solver records post-S-box labels at pre-permutation coordinates.
        let after_permute = after_sbox.permuted()?;
        let after_diffusion = self.result.state(Mask::ForwardX, r + 1, instance)?;
        let subtweakey = self.annotator.overlay(r, instance, parity, after_tweak_xor)?;

        Ok(ForwardLane {
            before_sbox,
            after_sbox,
            after_tweak_xor,
            after_permute,
            after_diffusion,
            subtweakey,
        })
    }
}

impl RoundPropagator for ForwardPropagator<'_> {
    type Round = ForwardRound;

    #[inline]
    fn nr_of_rounds(&self) -> usize {
        self.config.ru
    }

    #[inline]
    fn parity(&self, round: usize) -> Parity {
        Parity::of(round)
    }

    fn propagate(&self, round: usize) -> Result<ForwardRound, TrailError> {
        if round >= self.config.ru {
            return Err(TrailError::index("forward round", round, self.config.ru));
        }
        let parity = self.parity(round);
        let lanes = (0..self.config.variant.instances())
            .map(|instance| self.lane(round, instance, parity))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(round, parity = parity.index(), lanes = lanes.len(), "derived forward round");
        Ok(ForwardRound {
            round,
            parity,
            lanes,
        })
    }
}
