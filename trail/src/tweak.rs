//! Tweak-schedule annotation: which subtweakey cells carry a lazy tweak cell, and therefore get a
//! "framed" overlay in the diagram.
//!
//! The tweak permutation alternates structurally between even and odd rounds, so the solver gives
//! one lazy set per round parity. The forward trail uses the parity of its own round index, the
//! backward trail continues the absolute round counter from where the forward trail stopped.

use std::fmt;

use vob::Vob;

use crate::error::TrailError;
use crate::permutation::STATE_CELLS;
use crate::solution::{SolverResult, Variant};
use crate::state::TrailState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[inline]
    pub fn of(round: usize) -> Parity {
        if round % 2 == 0 { Parity::Even } else { Parity::Odd }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// The two parity-specific lazy sets. Each is a 16 slot lookup indexed by the filter position;
/// a slot holds the tweak cell id mapped there, or `None` when no tweak cell maps to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyCells {
    by_parity: [[Option<u8>; STATE_CELLS]; 2],
}

impl LazyCells {
    /// An empty `contradict` means no tweak cell is lazy.
    pub fn from_contradict(contradict: &[Vec<Vec<i64>>]) -> Result<Self, TrailError> {
        let mut by_parity = [[None; STATE_CELLS]; 2];
        if contradict.len() > 1 {
            return Err(TrailError::malformed("contradict",
                format!("expected at most 1 entry, found {}", contradict.len())));
        }
        let rows = match contradict.get(0) {
            Some(rows) => rows,
            None => return Ok(Self { by_parity }),
        };

        for (p, lookup) in by_parity.iter_mut().enumerate() {
            let row = rows.get(p)
                .ok_or_else(|| TrailError::malformed("contradict[0]",
                    format!("parity row {} is missing", p)))?;
            for (j, slot) in lookup.iter_mut().enumerate() {
                let flag = row.get(j)
                    .ok_or_else(|| TrailError::malformed(format!("contradict[0][{}]", p),
                        format!("flag {} is missing", j)))?;
                if *flag == 1 {
                    *slot = Some(j as u8);
                }
            }
        }
        Ok(Self { by_parity })
    }

    #[inline]
    pub fn lookup(&self, parity: Parity) -> &[Option<u8>; STATE_CELLS] {
        &self.by_parity[parity.index()]
    }

    pub fn contains(&self, parity: Parity, tweak_cell: u8) -> bool {
        self.lookup(parity).iter().any(|slot| *slot == Some(tweak_cell))
    }

    /// All lazy cells, even parity first, in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (Parity, u8)> + '_ {
        (0..2).flat_map(move |p| {
            let parity = if p == 0 { Parity::Even } else { Parity::Odd };
            self.by_parity[p].iter().filter_map(move |slot| slot.map(|c| (parity, c)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// The subtweakey view of one round and one trail instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakOverlay {
    /// Base labels, unchanged by the framing.
    pub labels: TrailState,
    /// Tweak cell id occupying each position.
    pub tweak_cells: [u8; STATE_CELLS],
    /// Bit `j` is set when position `j` holds a lazy tweak cell.
    pub framed: Vob,
}

impl TweakOverlay {
    #[inline]
    pub fn is_framed(&self, j: usize) -> bool {
        self.framed.get(j).unwrap_or(false)
    }

    pub fn framed_cells(&self) -> Vec<usize> {
        self.framed.iter()
            .enumerate()
            .filter(|(_, f)| *f)
            .map(|(j, _)| j)
            .collect()
    }
}

/// Decides the framing of every subtweakey cell. Built once per rendering pass.
#[derive(Debug, Clone)]
pub struct TweakAnnotator<'a> {
    result: &'a SolverResult,
    variant: Variant,
    lazy: LazyCells,
}

impl<'a> TweakAnnotator<'a> {
    pub fn new(result: &'a SolverResult, variant: Variant) -> Result<Self, TrailError> {
        Ok(Self {
            result,
            variant,
            lazy: LazyCells::from_contradict(&result.contradict)?,
        })
    }

    #[inline]
    pub fn lazy_cells(&self) -> &LazyCells {
        &self.lazy
    }

    /// Tweak cell ids in the tweakey state of `instance` at absolute round `round`.
    pub fn tweak_cells(&self, round: usize, instance: usize) -> Result<[u8; STATE_CELLS], TrailError> {
        if instance >= self.variant.instances() {
            return Err(TrailError::index("trail instance", instance, self.variant.instances()));
        }
        let perm = self.result.tweak_permutation(round, instance)?;
        let mut cells = [0u8; STATE_CELLS];
        cells.copy_from_slice(perm);
        Ok(cells)
    }

    /// Position `j` is framed iff the tweak cell found there is in the lazy set of `parity`.
    /// Depends on the permutation and the parity only, never on the labels of the instance.
    pub fn framed(&self, round: usize, instance: usize, parity: Parity) -> Result<Vob, TrailError> {
        let cells = self.tweak_cells(round, instance)?;
        Ok(cells.iter()
            .map(|c| self.lazy.contains(parity, *c))
            .collect())
    }

    /// Overlays the framing on `labels`.
    pub fn overlay(&self, round: usize, instance: usize, parity: Parity, labels: TrailState)
                   -> Result<TweakOverlay, TrailError>
    {
        Ok(TweakOverlay {
            labels,
            tweak_cells: self.tweak_cells(round, instance)?,
            framed: self.framed(round, instance, parity)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{ResultBuilder, RoundConfig};

    #[test]
    fn parity_of_round() {
        assert_eq!(Parity::of(0), Parity::Even);
        assert_eq!(Parity::of(3), Parity::Odd);
        assert_eq!(Parity::of(8).index(), 0);
    }

    #[test]
    fn lazy_lookup_has_empty_slots_for_unflagged_cells() {
        let contradict = vec![vec![
            {let mut r = vec![0i64; 16]; r[3] = 1; r[9] = 1; r},
            {let mut r = vec![0i64; 16]; r[0] = 1; r},
        ]];
        let lazy = LazyCells::from_contradict(&contradict).unwrap();

        assert_eq!(lazy.lookup(Parity::Even)[3], Some(3));
        assert_eq!(lazy.lookup(Parity::Even)[4], None);
        assert!(lazy.contains(Parity::Even, 9));
        assert!(!lazy.contains(Parity::Odd, 9));
        assert!(lazy.contains(Parity::Odd, 0));
        assert_eq!(lazy.iter().collect::<Vec<_>>(),
                   vec![(Parity::Even, 3), (Parity::Even, 9), (Parity::Odd, 0)]);
    }

    #[test]
    fn more_than_one_contradict_entry_is_malformed() {
        let rows = vec![vec![0i64; 16]; 2];
        let err = LazyCells::from_contradict(&[rows.clone(), rows]).unwrap_err();
        assert_eq!(err, TrailError::malformed("contradict", "expected at most 1 entry, found 2"));
    }

    #[test]
    fn framing_follows_the_tweak_permutation() {
        let config = RoundConfig::new(Variant::Qarma64, 2, 1, 4);
        let mut perm: Vec<u8> = (0..16).collect();
        perm.swap(3, 12);
        let result = ResultBuilder::new(config)
            .lazy(Parity::Odd, 3)
            .tweak_permutation(1, perm)
            .build();
        let annotator = TweakAnnotator::new(&result, config.variant).unwrap();

        // Tweak cell 3 sits at position 12 in round 1.
        let overlay = annotator.overlay(1, 0, Parity::Odd, TrailState::inactive()).unwrap();
        assert_eq!(overlay.framed_cells(), vec![12]);
        assert_eq!(overlay.tweak_cells[12], 3);

        // Wrong parity: nothing framed.
        let overlay = annotator.overlay(1, 0, Parity::Even, TrailState::inactive()).unwrap();
        assert!(overlay.framed_cells().is_empty());
    }

    #[test]
    fn framing_never_touches_the_labels() {
        let config = RoundConfig::new(Variant::Qarma64, 1, 1, 2);
        let result = ResultBuilder::new(config).lazy(Parity::Even, 0).build();
        let annotator = TweakAnnotator::new(&result, config.variant).unwrap();

        let labels = TrailState::inactive();
        let overlay = annotator.overlay(0, 0, Parity::Even, labels).unwrap();
        assert_eq!(overlay.labels, labels);
        assert!(overlay.is_framed(0));
    }

    #[test]
    fn unknown_instance_is_an_index_violation() {
        let config = RoundConfig::new(Variant::Qarma64, 1, 1, 2);
        let result = ResultBuilder::new(config).build();
        let annotator = TweakAnnotator::new(&result, config.variant).unwrap();
        match annotator.tweak_cells(0, 1) {
            Err(TrailError::IndexContractViolation { index, bound, .. }) => {
                assert_eq!((index, bound), (1, 1));
            },
            other => panic!("unexpected: {:?}", other),
        }
    }
}
