use std::convert::TryFrom;
use std::fmt;

use crate::error::TrailError;
use crate::label::{ActivityLabel, Style};
use crate::permutation::{inv_permute, STATE_CELLS};

/// The labels of all 16 cells at one operation boundary, for one trail instance.
///
/// A TrailState is derived fresh from the solver result every time it is needed and is never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailState {
    cells: [ActivityLabel; STATE_CELLS],
}

impl TrailState {
    pub fn new(cells: [ActivityLabel; STATE_CELLS]) -> Self {
        Self { cells }
    }

    /// A state where every cell is inactive.
    pub fn inactive() -> Self {
        Self::new([ActivityLabel::Zero; STATE_CELLS])
    }

    /// Parses the solver's raw encoding of a state. `path` is the field path of `raw` inside the
    /// solver result, it is only used for error reporting.
    pub fn from_raw(raw: &[i64], path: &str) -> Result<Self, TrailError> {
        if raw.len() != STATE_CELLS {
            return Err(TrailError::malformed(
                path,
                format!("expected {} cells, found {}", STATE_CELLS, raw.len())));
        }

        let mut cells = [ActivityLabel::Zero; STATE_CELLS];
        for (j, value) in raw.iter().enumerate() {
            cells[j] = u8::try_from(*value)
                .ok()
                .and_then(|v| ActivityLabel::try_from(v).ok())
                .ok_or_else(|| TrailError::malformed(
                    format!("{}[{}]", path, j),
                    format!("label {} is outside 0..=3", value)))?;
        }
        Ok(Self { cells })
    }

    #[inline]
    pub fn cells(&self) -> &[ActivityLabel; STATE_CELLS] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, j: usize) -> Result<ActivityLabel, TrailError> {
        self.cells.get(j)
            .copied()
            .ok_or_else(|| TrailError::index("trail state cell", j, STATE_CELLS))
    }

    pub fn styles(&self) -> impl Iterator<Item = Style> + '_ {
        self.cells.iter().map(|l| l.style())
    }

    /// The state as the permutation layer leaves it: `permuted[P[k]] == self[k]`.
    pub fn permuted(&self) -> Result<TrailState, TrailError> {
        let mut cells = [ActivityLabel::Zero; STATE_CELLS];
        for (j, cell) in cells.iter_mut().enumerate() {
            *cell = self.cell(inv_permute(j)?)?;
        }
        Ok(TrailState { cells })
    }

    pub fn active_cells(&self) -> Vec<usize> {
        self.cells.iter()
            .enumerate()
            .filter(|(_, l)| l.is_active())
            .map(|(j, _)| j)
            .collect()
    }

    pub fn is_inactive(&self) -> bool {
        self.cells.iter().all(|l| !l.is_active())
    }
}

/// Prints the state as a 4x4 grid of style glyphs, row major.
impl fmt::Display for TrailState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(4) {
            let line: String = row.iter().map(|l| l.style().glyph()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::CELL_PERMUTATION;

    #[test]
    fn from_raw_rejects_bad_labels_with_a_cell_path() {
        let mut raw = vec![0i64; 16];
        raw[5] = 7;
        let err = TrailState::from_raw(&raw, "forward_mask_x[0][0]").unwrap_err();
        assert_eq!(err, TrailError::MalformedResult {
            path: "forward_mask_x[0][0][5]".to_string(),
            reason: "label 7 is outside 0..=3".to_string(),
        });
    }

    #[test]
    fn from_raw_rejects_values_beyond_a_byte() {
        for bad in [256, -1, 259].iter() {
            let mut raw = [0i64; 16];
            raw[9] = *bad;
            let err = TrailState::from_raw(&raw, "backward_mask_x[0][0]").unwrap_err();
            assert_eq!(err, TrailError::MalformedResult {
                path: "backward_mask_x[0][0][9]".to_string(),
                reason: format!("label {} is outside 0..=3", bad),
            });
        }
    }

    #[test]
    fn from_raw_rejects_short_states() {
        let err = TrailState::from_raw(&[0i64; 15], "backward_mask_sbx[1][0]").unwrap_err();
        match err {
            TrailError::MalformedResult { path, .. } => assert_eq!(path, "backward_mask_sbx[1][0]"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn permuted_moves_cells_to_their_new_position() {
        for k in 0..STATE_CELLS {
            let mut raw = [0i64; 16];
            raw[k] = 2;
            let state = TrailState::from_raw(&raw, "s").unwrap();
            let permuted = state.permuted().unwrap();
            assert_eq!(permuted.active_cells(), vec![CELL_PERMUTATION[k]]);
            assert_eq!(permuted.cell(CELL_PERMUTATION[k]).unwrap(), ActivityLabel::NonzeroAny);
        }
    }

    #[test]
    fn grid_display() {
        let mut raw = [0i64; 16];
        raw[0] = 1;
        raw[5] = 2;
        raw[15] = 3;
        let state = TrailState::from_raw(&raw, "s").unwrap();
        assert_eq!(format!("{}", state), "F...\n.A..\n....\n...?\n");
    }
}
