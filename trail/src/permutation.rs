//! The cell permutation of the QARMA-v2 state, shared by both state widths.
//!
//! A cell originally at position `k` moves to position `CELL_PERMUTATION[k]`. The solver records
//! labels at pre-permutation coordinates, while the diagram draws the state after the permutation
//! layer, so the propagators read through the inverse table.

use crate::error::TrailError;

/// Number of cells in one trail state.
pub const STATE_CELLS: usize = 16;

pub const CELL_PERMUTATION: [usize; STATE_CELLS] =
    [0, 5, 15, 10, 13, 8, 2, 7, 11, 14, 4, 1, 6, 3, 9, 12];

pub const INV_CELL_PERMUTATION: [usize; STATE_CELLS] = invert(&CELL_PERMUTATION);

const fn invert(table: &[usize; STATE_CELLS]) -> [usize; STATE_CELLS] {
    let mut inverse = [0; STATE_CELLS];
    let mut k = 0;
    while k < STATE_CELLS {
        inverse[table[k]] = k;
        k += 1;
    }
    inverse
}

/// Position the cell at `k` is moved to by the permutation layer.
#[inline]
pub fn permute(k: usize) -> Result<usize, TrailError> {
    CELL_PERMUTATION.get(k)
        .copied()
        .ok_or_else(|| TrailError::index("cell permutation", k, STATE_CELLS))
}

/// Pre-permutation position of the cell found at `j` after the permutation layer.
#[inline]
pub fn inv_permute(j: usize) -> Result<usize, TrailError> {
    INV_CELL_PERMUTATION.get(j)
        .copied()
        .ok_or_else(|| TrailError::index("inverse cell permutation", j, STATE_CELLS))
}
