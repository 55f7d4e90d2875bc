//! Run configuration and validation
//!
//! A [`RunConfig`] is what an operator writes: which regions are active, in what
//! order, and how much each should emit. [`RunConfig::plan`] validates it once
//! against a [`RegionCatalogue`] and produces an immutable [`RunPlan`] that the
//! pipeline executes.
//!
//! The order of `regions` matters. Overlapping regions share their common ocean
//! cells on a first-come basis when areas are computed, and later regions
//! overwrite earlier ones when rates are painted.
//!
//! ```rust
//! use mcb_core::config::RunConfig;
//!
//! let config = RunConfig::from_toml_str(
//!     r#"
//! regions = [3, 7]
//!
//! [targets]
//! mode = "per_region"
//! values = [
//!     { region = 3, tg_per_year = 5.0 },
//!     { region = 7, tg_per_year = 2.0 },
//! ]
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.regions.len(), 2);
//! ```

use crate::area::DEFAULT_EARTH_RADIUS;
use crate::distribute::MergePolicy;
use crate::errors::{McbError, McbResult};
use crate::field::FieldMetadata;
use crate::region::{Region, RegionCatalogue, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Annual emission target for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionTarget {
    pub region: RegionId,
    /// unit: Tg / yr
    pub tg_per_year: f64,
}

/// How a single global total is shared between the active regions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalSplit {
    /// Every region emits `total / n`
    #[default]
    EqualMass,
    /// One flux over the combined claimed ocean area, so each region emits in
    /// proportion to its area
    UniformFlux,
}

/// Emission targets for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EmissionTargets {
    /// An explicit target for each active region
    PerRegion { values: Vec<RegionTarget> },
    /// A single total shared between the active regions
    GlobalTotal {
        /// unit: Tg / yr
        tg_per_year: f64,
        #[serde(default)]
        split: GlobalSplit,
    },
}

/// Replacement merge policy for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOverride {
    pub region: RegionId,
    pub policy: MergePolicy,
}

fn default_earth_radius() -> f64 {
    DEFAULT_EARTH_RADIUS
}

/// Operator-facing description of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Active regions in processing order
    pub regions: Vec<RegionId>,
    pub targets: EmissionTargets,
    #[serde(default)]
    pub merge_overrides: Vec<MergeOverride>,
    #[serde(default)]
    pub field: FieldMetadata,
    /// Radius of the spherical Earth used for cell areas (m)
    #[serde(default = "default_earth_radius")]
    pub earth_radius: f64,
}

/// How rates are derived from targets once areas are known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateMode {
    /// Each region's rate comes from its own target and area
    PerRegion,
    /// One rate from the total target and the summed area of all regions
    UniformFlux { tg_per_year: f64 },
}

/// A region scheduled for a run, with its resolved target and merge policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRegion {
    pub region: Region,
    /// unit: Tg / yr
    pub target_tg_per_year: f64,
    pub merge: MergePolicy,
}

/// Validated, immutable description of a run
///
/// Only [`RunConfig::plan`] builds one; a plan cannot be read back from text.
///
/// ```compile_fail
/// let plan: mcb_core::config::RunPlan = toml::from_str("earth_radius = -1.0").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPlan {
    regions: Vec<PlannedRegion>,
    rate_mode: RateMode,
    field: FieldMetadata,
    earth_radius: f64,
}

impl RunPlan {
    /// Regions in processing order
    pub fn regions(&self) -> &[PlannedRegion] {
        &self.regions
    }

    pub fn rate_mode(&self) -> RateMode {
        self.rate_mode
    }

    pub fn field(&self) -> &FieldMetadata {
        &self.field
    }

    pub fn earth_radius(&self) -> f64 {
        self.earth_radius
    }

    /// Total requested emission over all regions (Tg/yr)
    pub fn requested_tg_per_year(&self) -> f64 {
        match self.rate_mode {
            RateMode::UniformFlux { tg_per_year } => tg_per_year,
            RateMode::PerRegion => self.regions.iter().map(|r| r.target_tg_per_year).sum(),
        }
    }
}

fn check_target(context: &str, value: f64) -> McbResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(McbError::InvalidConfig(format!(
            "target for {} must be a finite, non-negative Tg/yr value, got {}",
            context, value
        )));
    }
    Ok(())
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> McbResult<Self> {
        toml::from_str(s).map_err(|e| McbError::Format {
            path: "<run configuration>".to_string(),
            details: e.to_string(),
        })
    }

    /// Validate the configuration against `catalogue` and resolve it into a plan.
    pub fn plan(&self, catalogue: &RegionCatalogue) -> McbResult<RunPlan> {
        if self.regions.is_empty() {
            return Err(McbError::InvalidConfig(
                "no active regions selected".to_string(),
            ));
        }
        if !self.earth_radius.is_finite() || self.earth_radius <= 0.0 {
            return Err(McbError::InvalidConfig(format!(
                "earth radius must be positive, got {}",
                self.earth_radius
            )));
        }

        let mut seen = BTreeSet::new();
        let mut regions = Vec::with_capacity(self.regions.len());
        for id in &self.regions {
            if !seen.insert(*id) {
                return Err(McbError::InvalidConfig(format!(
                    "region {} selected more than once",
                    id
                )));
            }
            let region = catalogue.get(*id).ok_or_else(|| {
                McbError::InvalidConfig(format!("unknown region {}", id))
            })?;
            region.validate()?;
            regions.push(region.clone());
        }

        let overrides = self.merge_overrides(&seen)?;
        let (targets, rate_mode) = self.resolve_targets(&seen)?;

        let regions = regions
            .into_iter()
            .map(|region| PlannedRegion {
                target_tg_per_year: targets[&region.id],
                merge: overrides.get(&region.id).copied().unwrap_or(region.merge),
                region,
            })
            .collect();

        Ok(RunPlan {
            regions,
            rate_mode,
            field: self.field.clone(),
            earth_radius: self.earth_radius,
        })
    }

    fn merge_overrides(
        &self,
        active: &BTreeSet<RegionId>,
    ) -> McbResult<BTreeMap<RegionId, MergePolicy>> {
        let mut overrides = BTreeMap::new();
        for o in &self.merge_overrides {
            if !active.contains(&o.region) {
                warn!(region = %o.region, "Ignoring merge override for inactive region");
                continue;
            }
            if overrides.insert(o.region, o.policy).is_some() {
                return Err(McbError::InvalidConfig(format!(
                    "merge policy for {} given more than once",
                    o.region
                )));
            }
        }
        Ok(overrides)
    }

    fn resolve_targets(
        &self,
        active: &BTreeSet<RegionId>,
    ) -> McbResult<(BTreeMap<RegionId, f64>, RateMode)> {
        match &self.targets {
            EmissionTargets::PerRegion { values } => {
                let mut targets = BTreeMap::new();
                for t in values {
                    check_target(&t.region.to_string(), t.tg_per_year)?;
                    if !active.contains(&t.region) {
                        warn!(region = %t.region, "Ignoring target for inactive region");
                        continue;
                    }
                    if targets.insert(t.region, t.tg_per_year).is_some() {
                        return Err(McbError::InvalidConfig(format!(
                            "target for {} given more than once",
                            t.region
                        )));
                    }
                }
                if let Some(missing) = active.iter().find(|id| !targets.contains_key(id)) {
                    return Err(McbError::InvalidConfig(format!(
                        "no target given for active region {}",
                        missing
                    )));
                }
                Ok((targets, RateMode::PerRegion))
            }
            EmissionTargets::GlobalTotal { tg_per_year, split } => {
                check_target("global total", *tg_per_year)?;
                let share = tg_per_year / active.len() as f64;
                let targets = active.iter().map(|id| (*id, share)).collect();
                let mode = match split {
                    GlobalSplit::EqualMass => RateMode::PerRegion,
                    GlobalSplit::UniformFlux => RateMode::UniformFlux {
                        tg_per_year: *tg_per_year,
                    },
                };
                Ok((targets, mode))
            }
        }
    }
}
