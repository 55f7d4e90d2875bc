//! Regular latitude-longitude grids
//!
//! A [`LatLonGrid`] holds the cell centres of a global grid together with the
//! cell bounds used for area weighting. Bounds are guessed from the centres
//! when the source field does not carry them.
//!
//! Index lookup is row/column separable: [`LatLonGrid::rows_in`] and
//! [`LatLonGrid::columns_in`] select grid rows and columns independently and
//! regions combine them into cell sets.
//!
//! ```rust
//! use mcb_core::grid::LatLonGrid;
//! use ndarray::array;
//!
//! let grid = LatLonGrid::new(
//!     array![-45.0, -15.0, 15.0, 45.0],
//!     array![45.0, 135.0, 225.0, 315.0],
//! )
//! .unwrap();
//! assert_eq!(grid.rows_in(-30.0, 30.0), vec![1, 2]);
//! assert_eq!(grid.columns_in(200.0, 260.0), vec![2]);
//! ```

use crate::errors::{McbError, McbResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::Serialize;

/// Return every index `i` with `low <= coords[i] <= high`.
///
/// Both ends are inclusive. A grid point lying exactly on the boundary shared by
/// two adjacent regions is selected by both of them.
pub fn indices_in_box(coords: ArrayView1<f64>, low: f64, high: f64) -> Vec<usize> {
    coords
        .iter()
        .enumerate()
        .filter(|(_, c)| **c >= low && **c <= high)
        .map(|(i, _)| i)
        .collect()
}

/// Map a longitude onto [0, 360).
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Guess cell bounds from cell centres.
///
/// Interior bounds sit midway between neighbouring centres; the outer bounds are
/// extrapolated by half the neighbouring spacing. Returns an `(n, 2)` array of
/// `[lower, upper]` pairs in the same order as `points`.
pub fn guess_bounds(points: ArrayView1<f64>) -> McbResult<Array2<f64>> {
    let n = points.len();
    if n < 2 {
        return Err(McbError::InvalidGrid(format!(
            "cannot guess bounds from {} point(s)",
            n
        )));
    }

    let mut edges = Vec::with_capacity(n + 1);
    edges.push(points[0] - 0.5 * (points[1] - points[0]));
    for i in 0..n - 1 {
        edges.push(0.5 * (points[i] + points[i + 1]));
    }
    edges.push(points[n - 1] + 0.5 * (points[n - 1] - points[n - 2]));

    Ok(Array2::from_shape_fn((n, 2), |(i, k)| edges[i + k]))
}

fn check_monotonic(name: &str, points: ArrayView1<f64>) -> McbResult<()> {
    if points.is_empty() {
        return Err(McbError::InvalidGrid(format!("{} has no points", name)));
    }
    if let Some(bad) = points.iter().find(|v| !v.is_finite()) {
        return Err(McbError::InvalidGrid(format!(
            "{} contains a non-finite value ({})",
            name, bad
        )));
    }
    let increasing = points.windows(2).into_iter().all(|w| w[1] > w[0]);
    let decreasing = points.windows(2).into_iter().all(|w| w[1] < w[0]);
    if !(increasing || decreasing) {
        return Err(McbError::InvalidGrid(format!(
            "{} is not strictly monotonic",
            name
        )));
    }
    Ok(())
}

fn check_bounds(name: &str, points: usize, bounds: ArrayView2<f64>) -> McbResult<()> {
    if bounds.dim() != (points, 2) {
        return Err(McbError::InvalidGrid(format!(
            "{} bounds have shape {:?}, expected ({}, 2)",
            name,
            bounds.dim(),
            points
        )));
    }
    if bounds.iter().any(|v| !v.is_finite()) {
        return Err(McbError::InvalidGrid(format!(
            "{} bounds contain a non-finite value",
            name
        )));
    }
    Ok(())
}

/// A global latitude-longitude grid defined by its cell centres and bounds
///
/// Longitudes are in degrees East. Latitude and longitude centres must be
/// strictly monotonic; bounds are stored as `(n, 2)` arrays of `[lower, upper]`.
/// Grids are only built through [`LatLonGrid::new`] or [`LatLonGrid::with_bounds`].
///
/// ```compile_fail
/// let grid: mcb_core::grid::LatLonGrid = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatLonGrid {
    latitude: Array1<f64>,
    longitude: Array1<f64>,
    latitude_bounds: Array2<f64>,
    longitude_bounds: Array2<f64>,
}

impl LatLonGrid {
    /// Create a grid from cell centres, guessing the cell bounds.
    ///
    /// Guessed latitude bounds are clipped to [-90, 90] so that a regular global
    /// grid tiles the sphere exactly.
    pub fn new(latitude: Array1<f64>, longitude: Array1<f64>) -> McbResult<Self> {
        check_monotonic("latitude", latitude.view())?;
        check_monotonic("longitude", longitude.view())?;

        let latitude_bounds = guess_bounds(latitude.view())?.mapv(|b| b.clamp(-90.0, 90.0));
        let longitude_bounds = guess_bounds(longitude.view())?;

        Ok(Self {
            latitude,
            longitude,
            latitude_bounds,
            longitude_bounds,
        })
    }

    /// Create a grid from cell centres and explicit bounds.
    pub fn with_bounds(
        latitude: Array1<f64>,
        longitude: Array1<f64>,
        latitude_bounds: Array2<f64>,
        longitude_bounds: Array2<f64>,
    ) -> McbResult<Self> {
        check_monotonic("latitude", latitude.view())?;
        check_monotonic("longitude", longitude.view())?;
        check_bounds("latitude", latitude.len(), latitude_bounds.view())?;
        check_bounds("longitude", longitude.len(), longitude_bounds.view())?;
        if latitude_bounds.iter().any(|b| b.abs() > 90.0) {
            return Err(McbError::InvalidGrid(
                "latitude bounds must lie within [-90, 90]".to_string(),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
            latitude_bounds,
            longitude_bounds,
        })
    }

    /// Grid shape as `(n_lat, n_lon)`
    pub fn shape(&self) -> (usize, usize) {
        (self.latitude.len(), self.longitude.len())
    }

    pub fn latitude(&self) -> ArrayView1<f64> {
        self.latitude.view()
    }

    pub fn longitude(&self) -> ArrayView1<f64> {
        self.longitude.view()
    }

    pub fn latitude_bounds(&self) -> ArrayView2<f64> {
        self.latitude_bounds.view()
    }

    pub fn longitude_bounds(&self) -> ArrayView2<f64> {
        self.longitude_bounds.view()
    }

    /// Rows whose latitude centre lies in `[south, north]`.
    pub fn rows_in(&self, south: f64, north: f64) -> Vec<usize> {
        indices_in_box(self.latitude.view(), south, north)
    }

    /// Columns whose longitude centre lies in `[west, east]`.
    ///
    /// Centres are normalised to [0, 360) before comparison, so grids stored
    /// in a [-180, 180) convention match boxes given in degrees East.
    pub fn columns_in(&self, west: f64, east: f64) -> Vec<usize> {
        let normalized = self.longitude.mapv(normalize_longitude);
        indices_in_box(normalized.view(), west, east)
    }

    /// Check that `other` describes the same horizontal grid.
    ///
    /// Shapes must match exactly and cell centres must agree within `tolerance`
    /// degrees.
    pub fn ensure_matches(&self, other: &LatLonGrid, tolerance: f64) -> McbResult<()> {
        self.ensure_shape(other.shape(), "other grid")?;
        let coords_match = |a: ArrayView1<f64>, b: ArrayView1<f64>| {
            a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
        };
        if !coords_match(self.latitude(), other.latitude()) {
            return Err(McbError::GridMismatch {
                left: "reference grid".to_string(),
                right: "other grid".to_string(),
                details: "latitude centres differ".to_string(),
            });
        }
        if !coords_match(self.longitude(), other.longitude()) {
            return Err(McbError::GridMismatch {
                left: "reference grid".to_string(),
                right: "other grid".to_string(),
                details: "longitude centres differ".to_string(),
            });
        }
        Ok(())
    }

    /// Check that a 2-D field described as `what` has this grid's shape.
    pub fn ensure_shape(&self, shape: (usize, usize), what: &str) -> McbResult<()> {
        if shape != self.shape() {
            return Err(McbError::GridMismatch {
                left: "reference grid".to_string(),
                right: what.to_string(),
                details: format!("shape {:?} != {:?}", self.shape(), shape),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn four_by_four() -> LatLonGrid {
        LatLonGrid::new(
            array![-45.0, -15.0, 15.0, 45.0],
            array![45.0, 135.0, 225.0, 315.0],
        )
        .unwrap()
    }

    #[test]
    fn box_indices_are_inclusive() {
        let coords = array![0.0, 10.0, 20.0, 30.0];
        assert_eq!(indices_in_box(coords.view(), 10.0, 20.0), vec![1, 2]);
        assert_eq!(indices_in_box(coords.view(), 10.5, 19.5), Vec::<usize>::new());
        assert_eq!(indices_in_box(coords.view(), -5.0, 100.0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn rows_and_columns() {
        let grid = four_by_four();
        assert_eq!(grid.rows_in(-30.0, 30.0), vec![1, 2]);
        assert_eq!(grid.columns_in(200.0, 260.0), vec![2]);
        assert_eq!(grid.columns_in(0.0, 360.0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn columns_of_a_signed_longitude_grid() {
        let grid = LatLonGrid::new(array![-45.0, 45.0], array![-135.0, -45.0, 45.0, 135.0]).unwrap();
        // -135 -> 225, -45 -> 315
        assert_eq!(grid.columns_in(200.0, 260.0), vec![0]);
        assert_eq!(grid.columns_in(300.0, 360.0), vec![1]);
    }

    #[test]
    fn longitude_normalisation() {
        assert_eq!(normalize_longitude(-45.0), 315.0);
        assert_eq!(normalize_longitude(360.0), 0.0);
        assert_eq!(normalize_longitude(725.0), 5.0);
        assert_eq!(normalize_longitude(359.5), 359.5);
    }

    #[test]
    fn guessed_bounds_are_midpoints() {
        let bounds = guess_bounds(array![0.0, 10.0, 30.0].view()).unwrap();
        assert_eq!(bounds, array![[-5.0, 5.0], [5.0, 20.0], [20.0, 40.0]]);
    }

    #[test]
    fn guessed_latitude_bounds_clip_at_poles() {
        let grid = LatLonGrid::new(array![-60.0, 0.0, 60.0], array![0.0, 180.0]).unwrap();
        assert_eq!(grid.latitude_bounds()[[0, 0]], -90.0);
        assert_eq!(grid.latitude_bounds()[[2, 1]], 90.0);
    }

    #[test]
    fn decreasing_latitudes_are_allowed() {
        let grid = LatLonGrid::new(array![45.0, 15.0, -15.0, -45.0], array![0.0, 90.0]).unwrap();
        assert_eq!(grid.rows_in(-30.0, 30.0), vec![1, 2]);
    }

    #[test]
    fn non_monotonic_rejected() {
        let result = LatLonGrid::new(array![0.0, 10.0, 5.0], array![0.0, 90.0]);
        assert!(matches!(result, Err(McbError::InvalidGrid(_))));
    }

    #[test]
    fn single_point_cannot_guess_bounds() {
        let result = LatLonGrid::new(array![0.0], array![0.0, 90.0]);
        assert!(matches!(result, Err(McbError::InvalidGrid(_))));
    }

    #[test]
    fn explicit_bounds_shape_checked() {
        let result = LatLonGrid::with_bounds(
            array![0.0, 10.0],
            array![0.0, 90.0],
            array![[-5.0, 5.0]],
            array![[-45.0, 45.0], [45.0, 135.0]],
        );
        assert!(matches!(result, Err(McbError::InvalidGrid(_))));
    }

    #[test]
    fn mismatched_grids() {
        let grid = four_by_four();
        let other = LatLonGrid::new(array![-45.0, 45.0], array![45.0, 135.0]).unwrap();
        assert!(matches!(
            grid.ensure_matches(&other, 1e-6),
            Err(McbError::GridMismatch { .. })
        ));
        assert!(grid.ensure_matches(&four_by_four(), 1e-6).is_ok());
    }
}
