//! Job files describing a complete ancillary generation run
//!
//! A job file is TOML:
//!
//! ```toml
//! [inputs]
//! reference = "reference.json"
//! land_fraction = "land_fraction.json"
//!
//! [output]
//! path = "mcb_emissions.json"
//! report = "mcb_emissions.report.json"
//!
//! [run]
//! regions = [1, 3, 7]
//!
//! [run.targets]
//! mode = "global_total"
//! tg_per_year = 30.0
//!
//! [[regions]]
//! id = 16
//! name = "Custom box"
//! boxes = [[10.0, -10.0, 20.0, 10.0]]
//! ```
//!
//! Relative paths are resolved against the directory holding the job file.
//! `[[regions]]` entries extend the standard catalogue and replace standard
//! regions sharing their id.

use mcb_core::config::{RunConfig, RunPlan};
use mcb_core::errors::{McbError, McbResult};
use mcb_core::io::{FieldSink, FieldSource, JsonFieldSink, JsonFieldSource};
use mcb_core::pipeline::{compute_emissions, EmissionOutcome};
use mcb_core::region::Region;
use mcb_core::report::EmissionReport;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    /// Field supplying the grid and time axis of the output
    pub reference: PathBuf,
    pub land_fraction: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub path: PathBuf,
    /// Where to write the JSON run report, if anywhere
    #[serde(default)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    pub inputs: Inputs,
    pub output: Output,
    pub run: RunConfig,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl JobFile {
    pub fn from_toml_str(s: &str) -> McbResult<Self> {
        toml::from_str(s).map_err(|e| McbError::Format {
            path: "<job file>".to_string(),
            details: e.to_string(),
        })
    }

    /// Read a job file, resolving its relative paths against its directory.
    pub fn from_path(path: &Path) -> McbResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| McbError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let job: Self = toml::from_str(&text).map_err(|e| McbError::Format {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(job.relative_to(base))
    }

    /// Prefix every relative path with `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.inputs.reference);
        resolve(&mut self.inputs.land_fraction);
        resolve(&mut self.output.path);
        if let Some(report) = self.output.report.as_mut() {
            resolve(report);
        }
        self
    }

    /// Validate the run against the standard catalogue plus this job's regions.
    pub fn plan(&self) -> McbResult<RunPlan> {
        let catalogue = mcb_regions::catalogue_with(self.regions.iter().cloned())?;
        self.run.plan(&catalogue)
    }

    pub fn source(&self) -> JsonFieldSource {
        JsonFieldSource {
            reference: self.inputs.reference.clone(),
            land_fraction: self.inputs.land_fraction.clone(),
        }
    }

    pub fn sink(&self) -> JsonFieldSink {
        JsonFieldSink {
            path: self.output.path.clone(),
        }
    }
}

/// Run a planned job: load inputs, compute the field and hand it to `sink`.
///
/// Nothing reaches the sink unless every step succeeds.
pub fn execute(
    plan: &RunPlan,
    source: &dyn FieldSource,
    sink: &dyn FieldSink,
) -> McbResult<EmissionOutcome> {
    let inputs = source.load_inputs()?;
    let outcome = compute_emissions(plan, &inputs)?;
    outcome.report.log();
    sink.save(&outcome.field, inputs.grid())?;
    Ok(outcome)
}

/// Plan and execute `job`, writing the report if one was requested.
pub fn run_job(job: &JobFile) -> McbResult<EmissionReport> {
    let plan = job.plan()?;
    let outcome = execute(&plan, &job.source(), &job.sink())?;
    if let Some(path) = &job.output.report {
        write_report(&outcome.report, path)?;
    }
    Ok(outcome.report)
}

pub fn write_report(report: &EmissionReport, path: &Path) -> McbResult<()> {
    let text = serde_json::to_string_pretty(report).map_err(|e| McbError::Format {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    fs::write(path, text).map_err(|source| McbError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "Wrote run report");
    Ok(())
}
