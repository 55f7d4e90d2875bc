//! Emission flux fields
//!
//! An [`EmissionField`] is a `(time, lat, lon)` array of fluxes in kg m-2 s-1
//! together with the metadata the downstream ancillary tooling needs to
//! identify it.

use crate::units::FLUX_UNITS;
use ndarray::{Array1, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// STASH field identifier (model, section, item)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashCode {
    pub model: u32,
    pub section: u32,
    pub item: u32,
}

impl StashCode {
    pub const fn new(model: u32, section: u32, item: u32) -> Self {
        Self {
            model,
            section,
            item,
        }
    }

    /// Section 0 item 301: the first 2-D user ancillary slot
    pub const USER_ANCIL_2D: StashCode = StashCode::new(1, 0, 301);
}

impl Default for StashCode {
    fn default() -> Self {
        Self::USER_ANCIL_2D
    }
}

impl fmt::Display for StashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{:02}s{:02}i{:03}", self.model, self.section, self.item)
    }
}

/// Identification attached to an output field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMetadata {
    pub stash: StashCode,
    pub name: String,
    pub units: String,
}

impl Default for FieldMetadata {
    fn default() -> Self {
        Self {
            stash: StashCode::default(),
            name: "Sea-salt emissions".to_string(),
            units: FLUX_UNITS.to_string(),
        }
    }
}

/// Gridded emission flux, indexed `[time, lat, lon]`
///
/// Every time slice carries the same values; the time axis exists so the field
/// has the shape the ancillary tooling expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionField {
    pub metadata: FieldMetadata,
    time: Array1<f64>,
    data: Array3<f64>,
}

impl EmissionField {
    /// A zero field with one slice per entry in `time`.
    pub fn zeros(metadata: FieldMetadata, time: Array1<f64>, shape: (usize, usize)) -> Self {
        let data = Array3::zeros((time.len(), shape.0, shape.1));
        Self {
            metadata,
            time,
            data,
        }
    }

    pub fn n_times(&self) -> usize {
        self.time.len()
    }

    /// Horizontal shape as `(n_lat, n_lon)`
    pub fn shape(&self) -> (usize, usize) {
        let (_, n_lat, n_lon) = self.data.dim();
        (n_lat, n_lon)
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    #[inline]
    pub fn flux(&self, time: usize, row: usize, col: usize) -> f64 {
        self.data[[time, row, col]]
    }

    /// A single time slice
    pub fn slice(&self, time: usize) -> ArrayView2<f64> {
        self.data.index_axis(Axis(0), time)
    }

    pub fn data(&self) -> ArrayView3<f64> {
        self.data.view()
    }

    /// Set a cell's flux in every time slice.
    pub fn set_cell(&mut self, row: usize, col: usize, value: f64) {
        self.data
            .slice_mut(ndarray::s![.., row, col])
            .fill(value);
    }

    /// Add to a cell's flux in every time slice.
    pub fn add_to_cell(&mut self, row: usize, col: usize, value: f64) {
        self.data
            .slice_mut(ndarray::s![.., row, col])
            .mapv_inplace(|v| v + value);
    }

    pub fn into_data(self) -> Array3<f64> {
        self.data
    }
}
