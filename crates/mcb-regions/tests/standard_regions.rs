//! Standard regions on an N96 grid (1.25° × 1.875°).

use approx::assert_relative_eq;
use mcb_core::area::DEFAULT_EARTH_RADIUS;
use mcb_core::config::{EmissionTargets, RegionTarget, RunConfig};
use mcb_core::field::FieldMetadata;
use mcb_core::grid::LatLonGrid;
use mcb_core::pipeline::{compute_emissions, EmissionOutcome, GridInputs};
use mcb_core::region::RegionId;
use mcb_regions::{standard_catalogue, NORTH_ATLANTIC, NORTH_PACIFIC, WESTERN_NORTH_PACIFIC};
use ndarray::{Array1, Array2};

fn n96() -> GridInputs {
    let latitude = Array1::from_shape_fn(144, |i| -89.375 + 1.25 * i as f64);
    let longitude = Array1::from_shape_fn(192, |j| 0.9375 + 1.875 * j as f64);
    let grid = LatLonGrid::new(latitude, longitude).unwrap();
    GridInputs::new(grid, Array1::from(vec![0.0]), Array2::zeros((144, 192))).unwrap()
}

fn run(ids: &[RegionId], tg_per_year: f64) -> EmissionOutcome {
    let config = RunConfig {
        regions: ids.to_vec(),
        targets: EmissionTargets::PerRegion {
            values: ids
                .iter()
                .map(|&region| RegionTarget {
                    region,
                    tg_per_year,
                })
                .collect(),
        },
        merge_overrides: vec![],
        field: FieldMetadata::default(),
        earth_radius: DEFAULT_EARTH_RADIUS,
    };
    let plan = config.plan(&standard_catalogue()).unwrap();
    compute_emissions(&plan, &n96()).unwrap()
}

#[test]
fn test_western_north_pacific_adds_to_north_pacific() {
    let outcome = run(&[NORTH_PACIFIC, WESTERN_NORTH_PACIFIC], 1.0);
    let (north_pacific, western) = (&outcome.report.regions[0], &outcome.report.regions[1]);

    // 40.625°N, 180.9375°E lies in both regions
    let (row, col) = (104, 96);
    assert_relative_eq!(
        outcome.field.flux(0, row, col),
        north_pacific.rate + western.rate
    );
    // 40.625°N, 150.9375°E lies only in the Western North Pacific
    assert_relative_eq!(outcome.field.flux(0, row, 80), western.rate);

    // Only the part west of 170°E counts towards the Western North Pacific
    assert!(western.ocean_area_m2 < north_pacific.ocean_area_m2);
    assert!(outcome.report.integrated_tg_per_year > 2.0);
    assert!(!outcome.report.is_conserved());
}

#[test]
fn test_disjoint_standard_regions_conserve_mass() {
    let ids: Vec<RegionId> = standard_catalogue()
        .ids()
        .into_iter()
        .filter(|&id| id != WESTERN_NORTH_PACIFIC)
        .collect();
    let outcome = run(&ids, 2.0);

    assert_eq!(outcome.report.regions.len(), 13);
    assert_relative_eq!(
        outcome.report.integrated_tg_per_year,
        26.0,
        max_relative = 1e-9
    );
    assert!(outcome.report.is_conserved());
}

#[test]
fn test_north_atlantic_reaches_the_last_column() {
    let outcome = run(&[NORTH_ATLANTIC], 1.0);
    // 359.0625°E
    assert!(outcome.field.flux(0, 104, 191) > 0.0);
    assert_eq!(outcome.field.flux(0, 104, 0), 0.0);
}
