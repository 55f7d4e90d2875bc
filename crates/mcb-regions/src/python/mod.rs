use crate::{catalogue_with, standard_catalogue};
use mcb_core::region::{Region, RegionId};
use pyo3::prelude::*;
use pythonize::{depythonize, pythonize};

/// All standard regions as a list of dictionaries, in id order.
#[pyfunction]
pub fn standard_regions(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    let regions: Vec<Region> = standard_catalogue().iter().cloned().collect();
    Ok(pythonize(py, &regions)?)
}

/// A single standard region, or `None` if the id is unknown.
#[pyfunction]
pub fn get_region(py: Python<'_>, id: u32) -> PyResult<Option<Bound<'_, PyAny>>> {
    standard_catalogue()
        .get(RegionId(id))
        .map(|region| pythonize(py, region).map_err(PyErr::from))
        .transpose()
}

/// The standard regions with `custom` regions added or replacing them.
#[pyfunction]
pub fn extend_regions<'py>(
    py: Python<'py>,
    custom: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let custom: Vec<Region> = depythonize(custom)?;
    let regions: Vec<Region> = catalogue_with(custom)?.iter().cloned().collect();
    Ok(pythonize(py, &regions)?)
}

#[pymodule]
pub fn regions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add(
        "REGION_IDS",
        standard_catalogue().ids().into_iter().map(|id| id.0).collect::<Vec<_>>(),
    )?;
    m.add_function(wrap_pyfunction!(standard_regions, m)?)?;
    m.add_function(wrap_pyfunction!(get_region, m)?)?;
    m.add_function(wrap_pyfunction!(extend_regions, m)?)?;
    Ok(())
}
