//! Emission regions built from axis-aligned latitude-longitude boxes
//!
//! A [`Region`] is one or more [`RegionBox`]es. Regions crossing the Greenwich
//! meridian are written as two boxes, a western part ending near 360°E and an
//! eastern part starting near 0°E. The cells of a region are the union over its
//! boxes of `rows(box) × columns(box)`; the rows of one box are never paired with
//! the columns of another.
//!
//! ```rust
//! use mcb_core::region::{Region, RegionBox, RegionId};
//!
//! let south_east_atlantic = Region::new(
//!     RegionId(5),
//!     "South-East Atlantic",
//!     vec![
//!         RegionBox::new(335.0, -30.0, 359.5, 0.0),
//!         RegionBox::new(0.5, -30.0, 15.0, 0.0),
//!     ],
//! );
//! assert!(south_east_atlantic.validate().is_ok());
//! ```

use crate::distribute::MergePolicy;
use crate::errors::{McbError, McbResult};
use crate::grid::{normalize_longitude, LatLonGrid};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Numeric identifier of a region, displayed as `R<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A latitude-longitude box, serialised as `[west, south, east, north]`
///
/// Longitudes are in degrees East. An eastern edge of exactly 360 is kept as
/// 360 so that boxes such as `[290, 30, 360, 50]` reach the meridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct RegionBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl RegionBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The box with both longitudes mapped onto the [0, 360] convention.
    pub fn normalized(&self) -> Self {
        let east = normalize_longitude(self.east);
        let east = if east == 0.0 && self.east > 0.0 {
            360.0
        } else {
            east
        };
        Self {
            west: normalize_longitude(self.west),
            south: self.south,
            east,
            north: self.north,
        }
    }

    fn check(&self, region: &str) -> McbResult<()> {
        let invalid = |reason: String| McbError::InvalidRegion {
            region: region.to_string(),
            reason,
        };

        if [self.west, self.south, self.east, self.north]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(invalid(format!("box {} has a non-finite edge", self)));
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(invalid(format!("box {} extends past a pole", self)));
        }
        if self.south >= self.north {
            return Err(invalid(format!("box {} has south >= north", self)));
        }
        let normalized = self.normalized();
        if normalized.west >= normalized.east {
            return Err(invalid(format!(
                "box {} has west >= east after normalisation; split boxes crossing the meridian",
                self
            )));
        }
        Ok(())
    }
}

impl From<[f64; 4]> for RegionBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<RegionBox> for [f64; 4] {
    fn from(b: RegionBox) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}

impl fmt::Display for RegionBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.west, self.south, self.east, self.north
        )
    }
}

/// A named emission region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub boxes: Vec<RegionBox>,
    /// How this region's rate combines with values already painted by earlier regions
    #[serde(default)]
    pub merge: MergePolicy,
}

impl Region {
    pub fn new(id: RegionId, name: &str, boxes: Vec<RegionBox>) -> Self {
        Self {
            id,
            name: name.to_string(),
            boxes,
            merge: MergePolicy::default(),
        }
    }

    /// A region given as a single box that may cross the Greenwich meridian.
    ///
    /// If `west` lies east of `east` after normalisation the box is split into
    /// `[west, 360]` and `[0, east]`. A box ending exactly on the meridian keeps
    /// only its western part.
    pub fn wrapping(id: RegionId, name: &str, west: f64, south: f64, east: f64, north: f64) -> Self {
        let whole = RegionBox::new(west, south, east, north).normalized();
        let boxes = if whole.west < whole.east {
            vec![whole]
        } else if whole.east == 0.0 {
            vec![RegionBox::new(whole.west, south, 360.0, north)]
        } else {
            vec![
                RegionBox::new(whole.west, south, 360.0, north),
                RegionBox::new(0.0, south, whole.east, north),
            ]
        };
        Self::new(id, name, boxes)
    }

    pub fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }

    /// Human readable label, e.g. `R3 (North Pacific)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.id, self.name)
    }

    /// Check that the region has at least one well-formed box.
    pub fn validate(&self) -> McbResult<()> {
        if self.boxes.is_empty() {
            return Err(McbError::InvalidRegion {
                region: self.label(),
                reason: "no boxes defined".to_string(),
            });
        }
        self.boxes.iter().try_for_each(|b| b.check(&self.label()))
    }

    /// Grid cells covered by this region.
    ///
    /// Fails with [`McbError::EmptyRegion`] if no grid centre falls inside any box.
    pub fn cells(&self, grid: &LatLonGrid) -> McbResult<CellSet> {
        self.validate()?;

        let mut cells = BTreeSet::new();
        for b in self.boxes.iter().map(RegionBox::normalized) {
            let rows = grid.rows_in(b.south, b.north);
            let cols = grid.columns_in(b.west, b.east);
            for &i in &rows {
                for &j in &cols {
                    cells.insert((i, j));
                }
            }
        }

        if cells.is_empty() {
            return Err(McbError::EmptyRegion {
                region: self.label(),
            });
        }
        Ok(CellSet { cells })
    }
}

/// Ordered, duplicate-free set of `(row, column)` grid cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSet {
    cells: BTreeSet<(usize, usize)>,
}

impl CellSet {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cells.contains(&(row, col))
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().copied()
    }

    /// Distinct rows touched by the set
    pub fn rows(&self) -> Vec<usize> {
        let rows: BTreeSet<usize> = self.cells.iter().map(|&(i, _)| i).collect();
        rows.into_iter().collect()
    }

    /// Distinct columns touched by the set
    pub fn columns(&self) -> Vec<usize> {
        let cols: BTreeSet<usize> = self.cells.iter().map(|&(_, j)| j).collect();
        cols.into_iter().collect()
    }
}

impl FromIterator<(usize, usize)> for CellSet {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Lookup table of known regions keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionCatalogue {
    regions: BTreeMap<RegionId, Region>,
}

impl RegionCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, replacing any region with the same id.
    ///
    /// Returns the replaced region, if there was one.
    pub fn insert(&mut self, region: Region) -> Option<Region> {
        self.regions.insert(region.id, region)
    }

    pub fn with(mut self, region: Region) -> Self {
        self.insert(region);
        self
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }
}

impl FromIterator<Region> for RegionCatalogue {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self {
            regions: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}
