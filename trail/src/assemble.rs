//! Stitches the per-round output of both propagators into one Diagram.

use tracing::{debug, warn};

use crate::diagram::{Block, BlockKind, Diagram, Slot};
use crate::error::TrailError;
use crate::propagate::{BackwardPropagator, BackwardRound, ForwardPropagator, ForwardRound, RoundPropagator};
use crate::solution::{RoundConfig, SolverResult};
use crate::state::TrailState;
use crate::summary::attack_summary;
use crate::tweak::TweakAnnotator;

/// One rendering pass over one solver result. Holds nothing mutable: assembling twice yields
/// identical diagrams.
#[derive(Debug, Clone)]
pub struct TrailAssembler<'a> {
    result: &'a SolverResult,
    config: RoundConfig,
}

impl<'a> TrailAssembler<'a> {
    pub fn new(result: &'a SolverResult, config: RoundConfig) -> Self {
        Self {
            result,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Validates the solver result, derives every round in both directions and only then builds
    /// the blocks, so a failure never leaves a partial diagram behind.
    pub fn assemble(&self) -> Result<Diagram, TrailError> {
        if let Err(e) = self.result.validate(&self.config) {
            warn!(kind = e.kind(), error = %e, "rejecting solver result");
            return Err(e);
        }

        let annotator = TweakAnnotator::new(self.result, self.config.variant)?;
        let forward = ForwardPropagator::new(self.result, &annotator, self.config);
        let backward = BackwardPropagator::new(self.result, &annotator, self.config);

        let forward_rounds = forward.propagate_all()?;
        let backward_rounds = backward.propagate_all()?;

        let initial = self.lanes(|i| forward.initial_state(i))?;
        let terminal = self.lanes(|i| backward.terminal_state(i))?;
        // The handoff is taken from the backward trail, not derived a second time.
        let handoff: Vec<TrailState> = backward_rounds.first()
            .ok_or_else(|| TrailError::index("backward round", 0, self.config.rl))?
            .lanes.iter()
            .map(|lane| lane.before_inv_sbox)
            .collect();

        let mut blocks = Vec::with_capacity(self.config.ru + self.config.rl + 2);

        let mut header = Block::new(BlockKind::Header, None, None);
        header.insert_states(Slot::Initial, &initial);
        blocks.push(header);

        for round in forward_rounds.iter() {
            blocks.push(self.forward_block(round, &handoff));
        }
        for round in backward_rounds.iter() {
            blocks.push(self.backward_block(round, &terminal));
        }

        let summary = attack_summary(&annotator, &self.config)?;
        blocks.push(Block::new(BlockKind::Summary, None, None).with_text(summary));

        debug!(variant = %self.config.variant,
               forward = forward_rounds.len(),
               backward = backward_rounds.len(),
               blocks = blocks.len(),
               "assembled diagram");
        Ok(Diagram::new(self.config.variant, blocks, self.config.total_rounds()))
    }

    fn lanes<F>(&self, state: F) -> Result<Vec<TrailState>, TrailError>
        where F: Fn(usize) -> Result<TrailState, TrailError>
    {
        (0..self.config.variant.instances()).map(state).collect()
    }

    fn forward_block(&self, round: &ForwardRound, handoff: &[TrailState]) -> Block {
        let first = round.round == 0;
        let last = round.round + 1 == self.config.ru;
        let mut block = Block::new(BlockKind::Forward { first, last }, Some(round.round), Some(round.parity));

        // The first round's input is the header already.
        if !first {
            block.insert_states(Slot::BeforeSbox, round.lanes.iter().map(|l| &l.before_sbox));
        }
        block.insert_states(Slot::AfterSbox, round.lanes.iter().map(|l| &l.after_sbox));
        block.insert_overlays(round.lanes.iter().map(|l| &l.subtweakey));
        block.insert_states(Slot::AfterTweakXor, round.lanes.iter().map(|l| &l.after_tweak_xor));
        block.insert_states(Slot::AfterPermute, round.lanes.iter().map(|l| &l.after_permute));
        block.insert_states(Slot::AfterDiffusion, round.lanes.iter().map(|l| &l.after_diffusion));
        if last {
            block.insert_states(Slot::Handoff, handoff);
        }
        block
    }

    fn backward_block(&self, round: &BackwardRound, terminal: &[TrailState]) -> Block {
        let last = round.round + 1 == self.config.rl;
        let mut block = Block::new(BlockKind::Backward { last }, Some(round.round), Some(round.parity));

        block.insert_states(Slot::BeforeInvSbox, round.lanes.iter().map(|l| &l.before_inv_sbox));
        block.insert_states(Slot::AfterInvDiffusion, round.lanes.iter().map(|l| &l.after_inv_diffusion));
        block.insert_states(Slot::AfterInvPermute, round.lanes.iter().map(|l| &l.after_inv_permute));
        block.insert_overlays(round.lanes.iter().map(|l| &l.subtweakey));
        block.insert_states(Slot::BeforeTweakXor, round.lanes.iter().map(|l| &l.before_tweak_xor));
        block.insert_states(Slot::AfterTweakXor, round.lanes.iter().map(|l| &l.after_tweak_xor));
        if last {
            block.insert_states(Slot::Terminal, terminal);
        }
        block
    }
}

/// Convenience wrapper: one full rendering pass.
pub fn assemble(result: &SolverResult, config: RoundConfig) -> Result<Diagram, TrailError> {
    TrailAssembler::new(result, config).assemble()
}
