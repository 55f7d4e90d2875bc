//! Conversion of annual targets to fluxes and painting them onto the field
//!
//! A region's rate spreads its annual target evenly over its claimed ocean area:
//!
//! $$ F = \frac{E \cdot 10^9}{360 \cdot 86400 \cdot A} $$
//!
//! where $E$ is the target (Tg/yr), $A$ the ocean area (m^2) and $F$ the flux
//! (kg m-2 s-1).
//!
//! Painting ignores claims: every ocean cell inside a region receives the
//! region's rate, even cells whose area was counted towards an earlier region.
//! Where regions overlap, the later region's value replaces the earlier one
//! unless its [`MergePolicy`] is [`MergePolicy::Add`].

use crate::errors::{McbError, McbResult};
use crate::field::EmissionField;
use crate::mask::OceanMask;
use crate::region::CellSet;
use crate::units::tg_per_year_to_kg_per_second;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a region's rate combines with a value already in the field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Replace the existing value
    #[default]
    Overwrite,
    /// Add to the existing value
    Add,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Overwrite => write!(f, "overwrite"),
            MergePolicy::Add => write!(f, "add"),
        }
    }
}

/// Flux (kg m-2 s-1) that spreads `target_tg_per_year` over `ocean_area_m2`.
///
/// No guard against a zero area: the result is then infinite or NaN. Use
/// [`checked_region_rate`] when the result feeds a field.
pub fn region_rate(target_tg_per_year: f64, ocean_area_m2: f64) -> f64 {
    tg_per_year_to_kg_per_second(target_tg_per_year) / ocean_area_m2
}

/// [`region_rate`], failing with [`McbError::NonFiniteResult`] if the rate is not finite.
pub fn checked_region_rate(
    context: &str,
    target_tg_per_year: f64,
    ocean_area_m2: f64,
) -> McbResult<f64> {
    let rate = region_rate(target_tg_per_year, ocean_area_m2);
    if !rate.is_finite() {
        return Err(McbError::NonFiniteResult {
            quantity: "emission rate".to_string(),
            context: format!("{} (ocean area {} m2)", context, ocean_area_m2),
            value: rate,
        });
    }
    Ok(rate)
}

/// Write `rate` into every ocean cell of `cells`, in every time slice.
///
/// Returns the number of cells written.
pub fn apply_rate(
    field: &mut EmissionField,
    cells: &CellSet,
    mask: &OceanMask,
    rate: f64,
    policy: MergePolicy,
) -> usize {
    let mut painted = 0;
    for (i, j) in cells.iter().filter(|&(i, j)| mask.is_ocean(i, j)) {
        match policy {
            MergePolicy::Overwrite => field.set_cell(i, j, rate),
            MergePolicy::Add => field.add_to_cell(i, j, rate),
        }
        painted += 1;
    }
    painted
}
