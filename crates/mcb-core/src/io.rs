//! Loading inputs and saving fields
//!
//! Reading and writing meteorological file formats is left to external
//! tooling. The pipeline only sees the [`FieldSource`] and [`FieldSink`] traits.
//! [`JsonFieldSource`] and [`JsonFieldSink`] implement them over a JSON rendering
//! of a gridded field ([`GriddedField`]), which is enough to drive a run and to
//! hand the result to a converter.

use crate::errors::{McbError, McbResult};
use crate::field::{EmissionField, StashCode};
use crate::grid::LatLonGrid;
use crate::pipeline::GridInputs;
use ndarray::{Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Tolerance (degrees) when comparing the coordinates of two input fields
pub const COORDINATE_TOLERANCE: f64 = 1e-6;

/// A gridded field with its coordinates, indexed `[time, lat, lon]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedField {
    pub name: String,
    #[serde(default)]
    pub stash: Option<StashCode>,
    #[serde(default)]
    pub units: Option<String>,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    #[serde(default)]
    pub latitude_bounds: Option<Array2<f64>>,
    #[serde(default)]
    pub longitude_bounds: Option<Array2<f64>>,
    pub time: Array1<f64>,
    pub data: Array3<f64>,
}

impl GriddedField {
    /// The field's horizontal grid, guessing bounds where none are stored.
    pub fn grid(&self) -> McbResult<LatLonGrid> {
        match (&self.latitude_bounds, &self.longitude_bounds) {
            (Some(lat_b), Some(lon_b)) => LatLonGrid::with_bounds(
                self.latitude.clone(),
                self.longitude.clone(),
                lat_b.clone(),
                lon_b.clone(),
            ),
            _ => LatLonGrid::new(self.latitude.clone(), self.longitude.clone()),
        }
    }

    /// Check the data array agrees with the coordinates.
    pub fn validate(&self) -> McbResult<()> {
        let expected = (self.time.len(), self.latitude.len(), self.longitude.len());
        if self.data.dim() != expected {
            return Err(McbError::GridMismatch {
                left: format!("{} coordinates", self.name),
                right: format!("{} data", self.name),
                details: format!("data shape {:?} != {:?}", self.data.dim(), expected),
            });
        }
        Ok(())
    }

    /// Wrap an emission field for saving.
    pub fn from_emission_field(field: &EmissionField, grid: &LatLonGrid) -> Self {
        Self {
            name: field.metadata.name.clone(),
            stash: Some(field.metadata.stash),
            units: Some(field.metadata.units.clone()),
            latitude: grid.latitude().to_owned(),
            longitude: grid.longitude().to_owned(),
            latitude_bounds: Some(grid.latitude_bounds().to_owned()),
            longitude_bounds: Some(grid.longitude_bounds().to_owned()),
            time: field.time().clone(),
            data: field.data().to_owned(),
        }
    }

    pub fn read_json(path: &Path) -> McbResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| McbError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let field: Self = serde_json::from_str(&text).map_err(|e| McbError::Format {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        field.validate()?;
        Ok(field)
    }

    pub fn write_json(&self, path: &Path) -> McbResult<()> {
        let text = serde_json::to_string(self).map_err(|e| McbError::Format {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        fs::write(path, text).map_err(|source| McbError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Combine a reference field and a land-fraction field into run inputs.
///
/// The reference supplies the grid and time axis; the land fraction's first time
/// slice supplies the mask. Both must share the same horizontal grid.
pub fn grid_inputs(reference: &GriddedField, land_fraction: &GriddedField) -> McbResult<GridInputs> {
    reference.validate()?;
    land_fraction.validate()?;

    let grid = reference.grid()?;
    let land_grid = land_fraction.grid()?;
    grid.ensure_matches(&land_grid, COORDINATE_TOLERANCE)
        .map_err(|e| match e {
            McbError::GridMismatch { details, .. } => McbError::GridMismatch {
                left: reference.name.clone(),
                right: land_fraction.name.clone(),
                details,
            },
            other => other,
        })?;

    if land_fraction.time.is_empty() {
        return Err(McbError::GridMismatch {
            left: reference.name.clone(),
            right: land_fraction.name.clone(),
            details: "land fraction has no time slice".to_string(),
        });
    }
    let land = land_fraction.data.index_axis(Axis(0), 0).to_owned();

    GridInputs::new(grid, reference.time.clone(), land)
}

/// Supplier of the reference and land-fraction fields
pub trait FieldSource {
    fn load_reference(&self) -> McbResult<GriddedField>;
    fn load_land_fraction(&self) -> McbResult<GriddedField>;

    /// Load both fields and combine them into run inputs.
    fn load_inputs(&self) -> McbResult<GridInputs> {
        let reference = self.load_reference()?;
        let land_fraction = self.load_land_fraction()?;
        grid_inputs(&reference, &land_fraction)
    }
}

/// Destination for a finished emission field
pub trait FieldSink {
    fn save(&self, field: &EmissionField, grid: &LatLonGrid) -> McbResult<()>;
}

/// Reads both input fields from JSON files
#[derive(Debug, Clone)]
pub struct JsonFieldSource {
    pub reference: PathBuf,
    pub land_fraction: PathBuf,
}

impl FieldSource for JsonFieldSource {
    fn load_reference(&self) -> McbResult<GriddedField> {
        info!(path = %self.reference.display(), "Loading reference field");
        GriddedField::read_json(&self.reference)
    }

    fn load_land_fraction(&self) -> McbResult<GriddedField> {
        info!(path = %self.land_fraction.display(), "Loading land fraction");
        GriddedField::read_json(&self.land_fraction)
    }
}

/// Writes the emission field to a JSON file
#[derive(Debug, Clone)]
pub struct JsonFieldSink {
    pub path: PathBuf,
}

impl FieldSink for JsonFieldSink {
    fn save(&self, field: &EmissionField, grid: &LatLonGrid) -> McbResult<()> {
        info!(
            path = %self.path.display(),
            stash = %field.metadata.stash,
            "Saving emission field"
        );
        GriddedField::from_emission_field(field, grid).write_json(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldMetadata;
    use ndarray::array;

    fn field(name: &str, longitude: Array1<f64>, data: Array3<f64>) -> GriddedField {
        GriddedField {
            name: name.to_string(),
            stash: None,
            units: None,
            latitude: array![-45.0, 45.0],
            longitude,
            latitude_bounds: None,
            longitude_bounds: None,
            time: Array1::from_shape_fn(data.dim().0, |t| t as f64),
            data,
        }
    }

    #[test]
    fn combines_reference_and_land() {
        let reference = field("reference", array![90.0, 270.0], Array3::from_elem((3, 2, 2), 280.0));
        let land = field("land", array![90.0, 270.0], array![[[0.0, 1.0], [0.0, 0.0]]]);
        let inputs = grid_inputs(&reference, &land).unwrap();
        assert_eq!(inputs.time().len(), 3);
        assert_eq!(inputs.land_fraction(), &array![[0.0, 1.0], [0.0, 0.0]]);
    }

    #[test]
    fn mismatched_coordinates() {
        let reference = field("reference", array![90.0, 270.0], Array3::zeros((1, 2, 2)));
        let land = field("land", array![0.0, 180.0], Array3::zeros((1, 2, 2)));
        match grid_inputs(&reference, &land) {
            Err(McbError::GridMismatch { left, right, .. }) => {
                assert_eq!(left, "reference");
                assert_eq!(right, "land");
            }
            other => panic!("expected a grid mismatch, got {:?}", other),
        }
    }

    #[test]
    fn data_shape_must_match_coordinates() {
        let broken = field("broken", array![90.0, 270.0, 300.0], Array3::zeros((1, 2, 2)));
        assert!(matches!(broken.validate(), Err(McbError::GridMismatch { .. })));
    }

    #[test]
    fn json_round_trip_through_files() {
        let dir = std::env::temp_dir().join(format!("mcb-core-io-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("emissions.json");

        let grid = LatLonGrid::new(array![-45.0, 45.0], array![90.0, 270.0]).unwrap();
        let mut emissions = EmissionField::zeros(FieldMetadata::default(), array![0.0, 1.0], (2, 2));
        emissions.set_cell(0, 1, 2.5e-11);

        JsonFieldSink { path: path.clone() }.save(&emissions, &grid).unwrap();
        let loaded = GriddedField::read_json(&path).unwrap();
        assert_eq!(loaded.stash, Some(StashCode::USER_ANCIL_2D));
        assert_eq!(loaded.units.as_deref(), Some("kg m-2 s-1"));
        assert_eq!(loaded.data, emissions.data().to_owned());
        assert_eq!(loaded.grid().unwrap(), grid);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn values_read_back_exactly() {
        let dir = std::env::temp_dir().join(format!("mcb-core-io-exact-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("field.json");

        let mut original = field(
            "exact",
            array![0.9375 + 1.0 / 3.0, 270.0 / 7.0],
            Array3::from_shape_fn((1, 2, 2), |(_, i, j)| {
                10.0e9 / 31_104_000.0 / (2.0e13 + 7.0 * i as f64 + j as f64 / 3.0)
            }),
        );
        original.latitude = array![-89.375 / 3.0, 1.25 / 7.0];
        original.write_json(&path).unwrap();
        let loaded = GriddedField::read_json(&path).unwrap();
        assert_eq!(loaded, original);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = JsonFieldSource {
            reference: PathBuf::from("/nonexistent/reference.json"),
            land_fraction: PathBuf::from("/nonexistent/land.json"),
        };
        assert!(matches!(source.load_inputs(), Err(McbError::Io { .. })));
    }
}
