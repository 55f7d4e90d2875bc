use crate::area::{cell_areas_with_radius, AreaGrid, DEFAULT_EARTH_RADIUS};
use crate::config::RunConfig;
use crate::distribute::checked_region_rate;
use crate::errors::McbError;
use crate::grid::LatLonGrid;
use crate::pipeline::{compute_emissions_with_areas, GridInputs};
use crate::region::{Region, RegionCatalogue};
use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pythonize::{depythonize, pythonize};

impl From<McbError> for PyErr {
    fn from(err: McbError) -> PyErr {
        match err {
            McbError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Area (m²) of each cell described by `(n, 2)` latitude and longitude bounds.
#[pyfunction]
#[pyo3(signature = (latitude_bounds, longitude_bounds, radius=DEFAULT_EARTH_RADIUS))]
pub fn cell_areas<'py>(
    py: Python<'py>,
    latitude_bounds: PyReadonlyArray2<'py, f64>,
    longitude_bounds: PyReadonlyArray2<'py, f64>,
    radius: f64,
) -> Bound<'py, PyArray2<f64>> {
    cell_areas_with_radius(latitude_bounds.as_array(), longitude_bounds.as_array(), radius)
        .into_pyarray(py)
}

/// Flux (kg m-2 s-1) spreading `target_tg_per_year` evenly over `ocean_area_m2`.
///
/// Raises `ValueError` if the area is zero.
#[pyfunction]
pub fn region_rate(target_tg_per_year: f64, ocean_area_m2: f64) -> PyResult<f64> {
    Ok(checked_region_rate("python", target_tg_per_year, ocean_area_m2)?)
}

/// Compute an emission field.
///
/// `config` is a run configuration dictionary and `regions` a list of region
/// dictionaries (`id`, `name`, `boxes`, optional `merge`). Returns the flux array
/// indexed `[time, lat, lon]` and the run report as a dictionary.
#[pyfunction]
#[pyo3(signature = (latitude, longitude, time, land_fraction, config, regions))]
#[allow(clippy::too_many_arguments)]
pub fn compute_emissions<'py>(
    py: Python<'py>,
    latitude: PyReadonlyArray1<'py, f64>,
    longitude: PyReadonlyArray1<'py, f64>,
    time: PyReadonlyArray1<'py, f64>,
    land_fraction: PyReadonlyArray2<'py, f64>,
    config: &Bound<'py, PyAny>,
    regions: &Bound<'py, PyAny>,
) -> PyResult<(Bound<'py, PyArray3<f64>>, Bound<'py, PyAny>)> {
    let config: RunConfig = depythonize(config)?;
    let regions: Vec<Region> = depythonize(regions)?;
    let catalogue: RegionCatalogue = regions.into_iter().collect();
    let plan = config.plan(&catalogue)?;

    let grid = LatLonGrid::new(latitude.as_array().to_owned(), longitude.as_array().to_owned())?;
    let areas = AreaGrid::from_grid(&grid, plan.earth_radius());
    let inputs = GridInputs::new(
        grid,
        time.as_array().to_owned(),
        land_fraction.as_array().to_owned(),
    )?;

    let outcome = compute_emissions_with_areas(&plan, &inputs, areas)?;
    outcome.report.log();
    let report = pythonize(py, &outcome.report)?;
    Ok((outcome.field.into_data().into_pyarray(py), report))
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("DEFAULT_EARTH_RADIUS", DEFAULT_EARTH_RADIUS)?;
    m.add_function(wrap_pyfunction!(cell_areas, m)?)?;
    m.add_function(wrap_pyfunction!(region_rate, m)?)?;
    m.add_function(wrap_pyfunction!(compute_emissions, m)?)?;
    Ok(())
}
