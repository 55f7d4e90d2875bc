//! Area-weighted global totals of an emission field

use crate::area::AreaGrid;
use crate::errors::{McbError, McbResult};
use crate::field::EmissionField;
use crate::units::kg_per_second_to_tg_per_year;

/// Global emission rate (kg/s) from the first time slice of `field`.
///
/// Returns 0 for a field without time slices. Fails with
/// [`McbError::GridMismatch`] if `areas` is not on the field's grid.
pub fn total_kg_per_second(field: &EmissionField, areas: &AreaGrid) -> McbResult<f64> {
    if field.shape() != areas.shape() {
        return Err(McbError::GridMismatch {
            left: "emission field".to_string(),
            right: "cell areas".to_string(),
            details: format!("shape {:?} != {:?}", field.shape(), areas.shape()),
        });
    }
    if field.n_times() == 0 {
        return Ok(0.0);
    }
    Ok((&field.slice(0) * &areas.view()).sum())
}

/// Global annual emission (Tg/yr) implied by `field`.
///
/// All slices are identical by construction, so only the first is integrated.
pub fn total_tg_per_year(field: &EmissionField, areas: &AreaGrid) -> McbResult<f64> {
    total_kg_per_second(field, areas).map(kg_per_second_to_tg_per_year)
}
