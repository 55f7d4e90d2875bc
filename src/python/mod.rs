use mcb_core::python::core;
use mcb_regions::python::regions;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;
use std::ffi::CString;

#[pymodule]
#[pyo3(name = "_lib")]
fn mcb(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(core))?;
    m.add_wrapped(wrap_pymodule!(regions))?;

    set_path(m, "mcb._lib.core", "core")?;
    set_path(m, "mcb._lib.regions", "regions")?;

    Ok(())
}

fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let code = CString::new(format!(
        "\
import sys
sys.modules['{path}'] = {module}
    "
    ))
    .map_err(|e| PyValueError::new_err(e.to_string()))?;
    m.py().run(code.as_c_str(), None, Some(&m.dict()))
}
