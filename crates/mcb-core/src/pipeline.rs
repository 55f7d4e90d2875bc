//! End-to-end computation of an emission field from a validated plan
//!
//! The run is strictly sequential:
//!
//! 1. cell areas and the ocean mask are computed once for the grid;
//! 2. each region, in plan order, resolves its cells and claims its ocean area;
//! 3. rates are derived from targets and claimed areas;
//! 4. each region, again in plan order, paints its rate onto the field;
//! 5. the finished field is integrated as a consistency check.
//!
//! Any error aborts the run before a field is returned.

use crate::area::AreaGrid;
use crate::claims::{accumulate_ocean_area, ClaimGrid};
use crate::config::{RateMode, RunPlan};
use crate::distribute::{apply_rate, checked_region_rate, MergePolicy};
use crate::errors::{McbError, McbResult};
use crate::field::EmissionField;
use crate::grid::LatLonGrid;
use crate::integrate::total_tg_per_year;
use crate::mask::OceanMask;
use crate::region::CellSet;
use crate::report::{EmissionReport, RegionSummary};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

/// Horizontal grid, time template and land fraction for a run
#[derive(Debug, Clone, PartialEq)]
pub struct GridInputs {
    grid: LatLonGrid,
    time: Array1<f64>,
    land_fraction: Array2<f64>,
}

impl GridInputs {
    /// Bundle the inputs, checking that the land fraction lies on `grid`.
    pub fn new(grid: LatLonGrid, time: Array1<f64>, land_fraction: Array2<f64>) -> McbResult<Self> {
        grid.ensure_shape(land_fraction.dim(), "land fraction")?;
        Ok(Self {
            grid,
            time,
            land_fraction,
        })
    }

    pub fn grid(&self) -> &LatLonGrid {
        &self.grid
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn land_fraction(&self) -> &Array2<f64> {
        &self.land_fraction
    }
}

/// Field and report produced by a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionOutcome {
    pub field: EmissionField,
    pub areas: AreaGrid,
    pub report: EmissionReport,
}

/// Run `plan` on `inputs` with cell areas computed from the grid bounds.
pub fn compute_emissions(plan: &RunPlan, inputs: &GridInputs) -> McbResult<EmissionOutcome> {
    let areas = AreaGrid::from_grid(inputs.grid(), plan.earth_radius());
    compute_emissions_with_areas(plan, inputs, areas)
}

/// Run `plan` on `inputs` using precomputed cell areas.
pub fn compute_emissions_with_areas(
    plan: &RunPlan,
    inputs: &GridInputs,
    areas: AreaGrid,
) -> McbResult<EmissionOutcome> {
    let grid = inputs.grid();
    grid.ensure_shape(areas.shape(), "cell areas")?;
    let mask = OceanMask::from_land_fraction(inputs.land_fraction().view());
    info!(
        n_lat = grid.shape().0,
        n_lon = grid.shape().1,
        n_times = inputs.time().len(),
        ocean_cells = mask.ocean_count(),
        regions = plan.regions().len(),
        "Computing emission field"
    );

    // Areas must be claimed in plan order; later regions lose overlapping cells.
    let mut claims = ClaimGrid::new(grid.shape());
    let mut claimed: Vec<(CellSet, f64)> = Vec::with_capacity(plan.regions().len());
    for planned in plan.regions() {
        let cells = planned.region.cells(grid)?;
        let area = accumulate_ocean_area(&cells, &mask, &areas, &mut claims);
        debug!(
            region = %planned.region.id,
            cells = cells.len(),
            ocean_area_m2 = area,
            "Claimed ocean area"
        );
        claimed.push((cells, area));
    }
    let total_area: f64 = claimed.iter().map(|(_, area)| area).sum();

    let rates: Vec<f64> = match plan.rate_mode() {
        RateMode::PerRegion => plan
            .regions()
            .iter()
            .zip(&claimed)
            .map(|(planned, (_, area))| {
                checked_region_rate(&planned.region.label(), planned.target_tg_per_year, *area)
            })
            .collect::<McbResult<_>>()?,
        RateMode::UniformFlux { tg_per_year } => {
            let rate = checked_region_rate("all regions", tg_per_year, total_area)?;
            vec![rate; plan.regions().len()]
        }
    };

    let mut field = EmissionField::zeros(plan.field().clone(), inputs.time().clone(), grid.shape());
    let mut summaries = Vec::with_capacity(plan.regions().len());
    for ((planned, (cells, area)), &rate) in plan.regions().iter().zip(&claimed).zip(&rates) {
        // A shared flux is painted once per cell regardless of policy
        let merge = match plan.rate_mode() {
            RateMode::PerRegion => planned.merge,
            RateMode::UniformFlux { .. } => MergePolicy::Overwrite,
        };
        let painted = apply_rate(&mut field, cells, &mask, rate, merge);
        summaries.push(RegionSummary {
            id: planned.region.id,
            name: planned.region.name.clone(),
            target_tg_per_year: match plan.rate_mode() {
                RateMode::PerRegion => planned.target_tg_per_year,
                RateMode::UniformFlux { .. } => {
                    crate::units::kg_per_second_to_tg_per_year(rate * area)
                }
            },
            ocean_area_m2: *area,
            rate,
            cells_painted: painted,
            merge,
        });
    }

    let integrated = total_tg_per_year(&field, &areas)?;
    if !integrated.is_finite() {
        return Err(McbError::NonFiniteResult {
            quantity: "global total".to_string(),
            context: "integrated emission field".to_string(),
            value: integrated,
        });
    }

    let report = EmissionReport {
        regions: summaries,
        total_area_m2: total_area,
        requested_tg_per_year: plan.requested_tg_per_year(),
        integrated_tg_per_year: integrated,
    };

    Ok(EmissionOutcome {
        field,
        areas,
        report,
    })
}
