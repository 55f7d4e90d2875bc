//! Surface area of grid cells
//!
//! The area of a cell bounded by latitudes $\phi_s, \phi_n$ and longitudes
//! $\lambda_w, \lambda_e$ on a sphere of radius $R$ is
//!
//! $$ A = R^2 (\sin\phi_n - \sin\phi_s)(\lambda_e - \lambda_w) $$
//!
//! with longitudes in radians. Summed over a grid whose bounds tile the sphere
//! this recovers $4 \pi R^2$.

use crate::grid::LatLonGrid;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Spherical Earth radius used for cell areas (m)
///
/// Matches the radius the Met Office tooling uses when area-weighting fields,
/// so integrated totals agree with those produced upstream.
pub const DEFAULT_EARTH_RADIUS: f64 = 6_367_470.0;

/// Cell areas on a sphere of the default radius.
///
/// See [`cell_areas_with_radius`].
pub fn cell_areas(lat_bounds: ArrayView2<f64>, lon_bounds: ArrayView2<f64>) -> Array2<f64> {
    cell_areas_with_radius(lat_bounds, lon_bounds, DEFAULT_EARTH_RADIUS)
}

/// Cell areas (m^2) from `(n_lat, 2)` latitude bounds and `(n_lon, 2)` longitude bounds.
///
/// Bounds may be in either order; areas are always non-negative.
pub fn cell_areas_with_radius(
    lat_bounds: ArrayView2<f64>,
    lon_bounds: ArrayView2<f64>,
    radius: f64,
) -> Array2<f64> {
    let r2 = radius * radius;
    let lat_extent: Vec<f64> = lat_bounds
        .outer_iter()
        .map(|b| (b[1].to_radians().sin() - b[0].to_radians().sin()).abs())
        .collect();
    let lon_extent: Vec<f64> = lon_bounds
        .outer_iter()
        .map(|b| (b[1] - b[0]).abs().to_radians())
        .collect();

    Array2::from_shape_fn((lat_extent.len(), lon_extent.len()), |(i, j)| {
        r2 * lat_extent[i] * lon_extent[j]
    })
}

/// Immutable per-cell surface areas for a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaGrid {
    areas: Array2<f64>,
}

impl AreaGrid {
    /// Compute cell areas for `grid` on a sphere of the given radius.
    pub fn from_grid(grid: &LatLonGrid, radius: f64) -> Self {
        Self {
            areas: cell_areas_with_radius(grid.latitude_bounds(), grid.longitude_bounds(), radius),
        }
    }

    /// Wrap precomputed areas.
    ///
    /// Useful when areas come from elsewhere, e.g. an idealised unit-area grid.
    pub fn from_array(areas: Array2<f64>) -> Self {
        Self { areas }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.areas.dim()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.areas[[row, col]]
    }

    pub fn view(&self) -> ArrayView2<f64> {
        self.areas.view()
    }

    /// Total area of all cells (m^2)
    pub fn total(&self) -> f64 {
        self.areas.sum()
    }
}
