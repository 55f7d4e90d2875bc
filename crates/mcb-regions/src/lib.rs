//! Standard marine cloud brightening injection regions
//!
//! Boxes are `[west, south, east, north]` in degrees East. Regions that cross the
//! Greenwich meridian are stored as two boxes, stopping half a degree short of
//! it on either side. Region 6 has been retired and its id is not reused.
//!
//! The regions are meant to be processed in ascending id order. Where R3 and R7
//! overlap, R3 claims the ocean area and R7 adds its rate on top.

#[cfg(feature = "python")]
pub mod python;

use mcb_core::distribute::MergePolicy;
use mcb_core::errors::McbResult;
use mcb_core::region::{Region, RegionBox, RegionCatalogue, RegionId};
use tracing::{debug, warn};

pub const NORTH_EAST_PACIFIC: RegionId = RegionId(1);
pub const SOUTH_EAST_PACIFIC: RegionId = RegionId(2);
pub const NORTH_PACIFIC: RegionId = RegionId(3);
pub const SOUTH_PACIFIC: RegionId = RegionId(4);
pub const SOUTH_EAST_ATLANTIC: RegionId = RegionId(5);
pub const WESTERN_NORTH_PACIFIC: RegionId = RegionId(7);
pub const NORTH_WEST_PACIFIC: RegionId = RegionId(8);
pub const SOUTH_WEST_PACIFIC: RegionId = RegionId(9);
pub const SOUTH_ATLANTIC: RegionId = RegionId(10);
pub const NORTH_WEST_ATLANTIC: RegionId = RegionId(11);
pub const NORTH_ATLANTIC: RegionId = RegionId(12);
pub const SOUTH_EAST_INDIAN: RegionId = RegionId(13);
pub const NORTH_INDIAN: RegionId = RegionId(14);
pub const NORTHERN_OCEANS: RegionId = RegionId(15);

/// Ids no longer in use
pub const RETIRED: [RegionId; 1] = [RegionId(6)];

fn single(id: RegionId, name: &str, west: f64, south: f64, east: f64, north: f64) -> Region {
    Region::new(id, name, vec![RegionBox::new(west, south, east, north)])
}

/// The standard regions, R1 to R15 without R6.
pub fn standard_catalogue() -> RegionCatalogue {
    RegionCatalogue::new()
        .with(single(NORTH_EAST_PACIFIC, "North-East Pacific", 210.0, 0.0, 250.0, 30.0))
        .with(single(SOUTH_EAST_PACIFIC, "South-East Pacific", 250.0, -30.0, 290.0, 0.0))
        .with(single(NORTH_PACIFIC, "North Pacific", 170.0, 30.0, 240.0, 50.0))
        .with(single(SOUTH_PACIFIC, "South Pacific", 190.0, -50.0, 270.0, -30.0))
        .with(Region::new(
            SOUTH_EAST_ATLANTIC,
            "South-East Atlantic",
            vec![
                RegionBox::new(335.0, -30.0, 359.5, 0.0),
                RegionBox::new(0.5, -30.0, 15.0, 0.0),
            ],
        ))
        .with(
            single(WESTERN_NORTH_PACIFIC, "Western North Pacific", 140.0, 30.0, 210.0, 50.0)
                .with_merge(MergePolicy::Add),
        )
        .with(single(NORTH_WEST_PACIFIC, "North-West Pacific", 120.0, 0.0, 160.0, 30.0))
        .with(single(SOUTH_WEST_PACIFIC, "South-West Pacific", 150.0, -30.0, 190.0, 0.0))
        .with(Region::new(
            SOUTH_ATLANTIC,
            "South Atlantic",
            vec![
                RegionBox::new(305.0, -50.0, 359.5, -30.0),
                RegionBox::new(0.5, -50.0, 15.0, -30.0),
            ],
        ))
        .with(single(NORTH_WEST_ATLANTIC, "North-West Atlantic", 290.0, 0.0, 335.0, 30.0))
        .with(single(NORTH_ATLANTIC, "North Atlantic", 290.0, 30.0, 360.0, 50.0))
        .with(single(SOUTH_EAST_INDIAN, "South-East Indian", 70.0, -30.0, 110.0, 0.0))
        .with(single(NORTH_INDIAN, "North Indian", 45.0, 0.0, 100.0, 30.0))
        .with(single(NORTHERN_OCEANS, "Northern Oceans (extended)", 0.0, 50.0, 359.5, 80.0))
}

/// The standard catalogue extended with `custom` regions.
///
/// Custom regions are validated first. A custom region reusing a standard id
/// replaces it.
pub fn catalogue_with(custom: impl IntoIterator<Item = Region>) -> McbResult<RegionCatalogue> {
    let mut catalogue = standard_catalogue();
    for region in custom {
        region.validate()?;
        if RETIRED.contains(&region.id) {
            warn!(region = %region.id, "Custom region reuses a retired id");
        }
        match catalogue.insert(region.clone()) {
            Some(previous) => warn!(
                region = %region.id,
                replaced = %previous.name,
                "Custom region replaces a standard region"
            ),
            None => debug!(region = %region.label(), "Added custom region"),
        }
    }
    Ok(catalogue)
}
