//! Summary of a completed emissions run

use crate::distribute::MergePolicy;
use crate::region::RegionId;
use crate::units::M2_PER_MILLION_KM2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Relative difference between requested and integrated totals above which a
/// warning is logged
pub const TOTAL_MISMATCH_TOLERANCE: f64 = 1e-6;

/// Per-region outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: RegionId,
    pub name: String,
    /// unit: Tg / yr
    pub target_tg_per_year: f64,
    /// Ocean area counted towards this region after earlier claims (m^2)
    pub ocean_area_m2: f64,
    /// unit: kg m-2 s-1
    pub rate: f64,
    /// Number of ocean cells the rate was written to
    pub cells_painted: usize,
    pub merge: MergePolicy,
}

/// Outcome of a run, used for logging and the JSON report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionReport {
    pub regions: Vec<RegionSummary>,
    /// Total claimed ocean area across all regions (m^2)
    pub total_area_m2: f64,
    /// unit: Tg / yr
    pub requested_tg_per_year: f64,
    /// Global total recovered by integrating the field (Tg/yr)
    pub integrated_tg_per_year: f64,
}

impl EmissionReport {
    pub fn total_area_million_km2(&self) -> f64 {
        self.total_area_m2 / M2_PER_MILLION_KM2
    }

    /// Relative difference between the integrated and requested totals.
    ///
    /// Zero when both are zero.
    pub fn relative_mismatch(&self) -> f64 {
        let diff = (self.integrated_tg_per_year - self.requested_tg_per_year).abs();
        if diff == 0.0 {
            0.0
        } else {
            diff / self.requested_tg_per_year.abs().max(f64::MIN_POSITIVE)
        }
    }

    /// True if the integrated total matches the requested total within
    /// [`TOTAL_MISMATCH_TOLERANCE`].
    pub fn is_conserved(&self) -> bool {
        self.relative_mismatch() <= TOTAL_MISMATCH_TOLERANCE
    }

    /// Log the report at info level, warning if mass is not conserved.
    ///
    /// Overlapping regions painted with [`MergePolicy::Overwrite`] or
    /// [`MergePolicy::Add`] are expected to break conservation; the warning is
    /// informational.
    pub fn log(&self) {
        for r in &self.regions {
            info!(
                region = %r.id,
                name = %r.name,
                target_tg_per_year = r.target_tg_per_year,
                ocean_area_million_km2 = r.ocean_area_m2 / M2_PER_MILLION_KM2,
                cells = r.cells_painted,
                merge = %r.merge,
                "Emissions for {}, kg m-2 s-1: {:e}",
                r.id,
                r.rate
            );
        }
        info!(
            "Total area used for injection (million km2) = {}",
            self.total_area_million_km2()
        );
        info!(
            "Total emissions (Tg/yr) = {} (requested {})",
            self.integrated_tg_per_year, self.requested_tg_per_year
        );
        if !self.is_conserved() {
            warn!(
                requested = self.requested_tg_per_year,
                integrated = self.integrated_tg_per_year,
                relative_mismatch = self.relative_mismatch(),
                "Integrated total differs from the requested total; check for overlapping regions"
            );
        }
    }
}
