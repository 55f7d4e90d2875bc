//! Ocean area accumulation with overlap claims
//!
//! Regions are processed one after another in a caller-chosen order. Each ocean
//! cell contributes its area to the first region that reaches it; later regions
//! covering the same cell see it as already claimed and do not count it again.
//!
//! The outcome is deliberately order dependent. For two overlapping regions A
//! and B, processing A first gives A the full overlap and shrinks B; processing B
//! first does the reverse. Callers must therefore fix the processing order.

use crate::area::AreaGrid;
use crate::errors::McbResult;
use crate::grid::LatLonGrid;
use crate::mask::OceanMask;
use crate::region::{CellSet, Region};
use ndarray::Array2;

/// Per-cell record of which cells have already been counted towards a region's area
///
/// Starts fully unclaimed and is only ever written by [`accumulate_ocean_area`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimGrid {
    claimed: Array2<bool>,
}

impl ClaimGrid {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            claimed: Array2::from_elem(shape, false),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.claimed.dim()
    }

    #[inline]
    pub fn is_claimed(&self, row: usize, col: usize) -> bool {
        self.claimed[[row, col]]
    }

    /// Mark a cell as claimed, returning false if it was already claimed.
    pub fn claim(&mut self, row: usize, col: usize) -> bool {
        let cell = &mut self.claimed[[row, col]];
        if *cell {
            false
        } else {
            *cell = true;
            true
        }
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.iter().filter(|&&c| c).count()
    }
}

/// Sum the area of the unclaimed ocean cells in `cells`, claiming them as it goes.
pub fn accumulate_ocean_area(
    cells: &CellSet,
    mask: &OceanMask,
    areas: &AreaGrid,
    claims: &mut ClaimGrid,
) -> f64 {
    cells
        .iter()
        .filter(|&(i, j)| mask.is_ocean(i, j))
        .filter(|&(i, j)| claims.claim(i, j))
        .map(|(i, j)| areas.get(i, j))
        .sum()
}

/// Ocean area of `region` on `grid` not already claimed by an earlier region.
///
/// Resolves the region's cells and delegates to [`accumulate_ocean_area`].
pub fn ocean_area(
    region: &Region,
    grid: &LatLonGrid,
    mask: &OceanMask,
    areas: &AreaGrid,
    claims: &mut ClaimGrid,
) -> McbResult<f64> {
    let cells = region.cells(grid)?;
    Ok(accumulate_ocean_area(&cells, mask, areas, claims))
}
