use crate::label::ActivityLabel;
use crate::permutation::STATE_CELLS;
use crate::tweak::Parity;

use super::{Mask, RawMasks, RoundConfig, SolverResult};

/// Assembles a well formed SolverResult for a given round layout. Every cell starts out inactive,
/// every tweak permutation starts out as the identity, and no tweak cell is lazy.
///
/// Mostly useful to construct synthetic results for demos and tests.
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    config: RoundConfig,
    masks: Vec<(Mask, RawMasks)>,
    tk_permutation_per_round: Vec<Vec<u8>>,
    contradict: Vec<Vec<i64>>,
    keep_tweak_xor: bool,
}

impl ResultBuilder {
    pub fn new(config: RoundConfig) -> Self {
        let instances = config.variant.instances();
        let blank = |rounds: usize| vec![vec![vec![0i64; STATE_CELLS]; instances]; rounds];

        let masks = Mask::ALL.iter()
            .map(|mask| {
                let rounds = match mask {
                    Mask::ForwardX => config.ru + 1,
                    Mask::ForwardSbx | Mask::ForwardExx => config.ru,
                    _ => config.rl,
                };
                (*mask, blank(rounds))
            })
            .collect();

        let identity: Vec<u8> = (0..config.variant.tweak_cells() as u8).collect();

        Self {
            config,
            masks,
            tk_permutation_per_round: vec![identity; config.tweak_rounds_needed()],
            contradict: vec![vec![0i64; STATE_CELLS]; 2],
            keep_tweak_xor: true,
        }
    }

    /// Sets the label of one cell. Out of range coordinates are ignored.
    pub fn label(self, mask: Mask, round: usize, instance: usize, cell: usize,
                 label: ActivityLabel) -> Self {
        self.raw(mask, round, instance, cell, i64::from(label.raw()))
    }

    /// Sets a raw value, without checking it is a valid label.
    pub fn raw(mut self, mask: Mask, round: usize, instance: usize, cell: usize, value: i64) -> Self {
        if let Some((_, masks)) = self.masks.iter_mut().find(|(m, _)| *m == mask) {
            if let Some(c) = masks.get_mut(round)
                .and_then(|r| r.get_mut(instance))
                .and_then(|i| i.get_mut(cell)) {
                *c = value;
            }
        }
        self
    }

    /// Sets the same label in every cell of every round of `mask`.
    pub fn fill(mut self, mask: Mask, label: ActivityLabel) -> Self {
        if let Some((_, masks)) = self.masks.iter_mut().find(|(m, _)| *m == mask) {
            masks.iter_mut()
                .flat_map(|r| r.iter_mut())
                .flat_map(|i| i.iter_mut())
                .for_each(|c| *c = i64::from(label.raw()));
        }
        self
    }

    pub fn lazy(mut self, parity: Parity, cell: usize) -> Self {
        if let Some(flag) = self.contradict[parity.index()].get_mut(cell) {
            *flag = 1;
        }
        self
    }

    pub fn tweak_permutation(mut self, round: usize, permutation: Vec<u8>) -> Self {
        if let Some(p) = self.tk_permutation_per_round.get_mut(round) {
            *p = permutation;
        }
        self
    }

    /// Leaves out the tweak-XOR arrays, as a narrow-variant solver model does.
    pub fn without_tweak_xor(mut self) -> Self {
        self.keep_tweak_xor = false;
        self
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn build(self) -> SolverResult {
        let keep = self.keep_tweak_xor;
        let mut masks = self.masks;
        let mut take = |mask: Mask| -> RawMasks {
            masks.iter_mut()
                .find(|(m, _)| *m == mask)
                .map(|(_, v)| std::mem::take(v))
                .unwrap_or_default()
        };

        let forward_mask_x = take(Mask::ForwardX);
        let forward_mask_sbx = take(Mask::ForwardSbx);
        let forward_mask_exx = Some(take(Mask::ForwardExx)).filter(|_| keep);
        let backward_mask_x = take(Mask::BackwardX);
        let backward_mask_sbx = take(Mask::BackwardSbx);
        let backward_mask_exx = Some(take(Mask::BackwardExx)).filter(|_| keep);

        SolverResult {
            forward_mask_x,
            forward_mask_sbx,
            forward_mask_exx,
            backward_mask_x,
            backward_mask_sbx,
            backward_mask_exx,
            tk_permutation_per_round: self.tk_permutation_per_round,
            contradict: vec![self.contradict],
        }
    }
}
