//! Land/sea classification from a land-fraction field

use ndarray::{Array2, ArrayView2};

/// Returns true if a cell with this land fraction is open ocean.
///
/// Only an exact 0.0 counts as ocean: coastal cells with any land, however
/// small, are excluded. NaN fractions are treated as land.
#[inline]
pub fn is_ocean(land_fraction: f64) -> bool {
    land_fraction == 0.0
}

/// Per-cell ocean classification derived from a land-fraction field
#[derive(Debug, Clone, PartialEq)]
pub struct OceanMask {
    ocean: Array2<bool>,
}

impl OceanMask {
    pub fn from_land_fraction(land_fraction: ArrayView2<f64>) -> Self {
        Self {
            ocean: land_fraction.mapv(is_ocean),
        }
    }

    /// A mask in which every cell is ocean
    pub fn all_ocean(shape: (usize, usize)) -> Self {
        Self {
            ocean: Array2::from_elem(shape, true),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.ocean.dim()
    }

    #[inline]
    pub fn is_ocean(&self, row: usize, col: usize) -> bool {
        self.ocean[[row, col]]
    }

    /// Number of ocean cells
    pub fn ocean_count(&self) -> usize {
        self.ocean.iter().filter(|&&o| o).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn only_exact_zero_is_ocean() {
        assert!(is_ocean(0.0));
        assert!(is_ocean(-0.0));
        assert!(!is_ocean(1e-10));
        assert!(!is_ocean(1.0));
        assert!(!is_ocean(f64::NAN));
    }

    #[test]
    fn mask_from_field() {
        let mask = OceanMask::from_land_fraction(array![[0.0, 0.5], [1.0, 0.0]].view());
        assert!(mask.is_ocean(0, 0));
        assert!(!mask.is_ocean(0, 1));
        assert!(!mask.is_ocean(1, 0));
        assert!(mask.is_ocean(1, 1));
        assert_eq!(mask.ocean_count(), 2);
        assert_eq!(mask.shape(), (2, 2));
    }
}
