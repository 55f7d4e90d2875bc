//! Sea-salt emission ancillary generator
//!
//! # Usage
//!
//! ```bash
//! mcb-ancil job.toml -v
//! mcb-ancil job.toml --dry-run
//! ```

use clap::Parser;
use mcb::job::{run_job, JobFile};
use mcb_core::errors::McbResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Build a marine cloud brightening sea-salt emission field from a job file
#[derive(Parser, Debug)]
#[command(name = "mcb-ancil")]
#[command(about = "Distribute regional sea-salt emission targets onto a model grid")]
struct Args {
    /// Job file (TOML)
    job: PathBuf,

    /// Validate the job and list the planned regions without reading any fields
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn run(args: &Args) -> McbResult<()> {
    let job = JobFile::from_path(&args.job)?;

    if args.dry_run {
        let plan = job.plan()?;
        for planned in plan.regions() {
            println!(
                "{}\t{} Tg/yr\t{}",
                planned.region.label(),
                planned.target_tg_per_year,
                planned.merge
            );
        }
        println!("Total: {} Tg/yr", plan.requested_tg_per_year());
        return Ok(());
    }

    let report = run_job(&job)?;
    info!(
        output = %job.output.path.display(),
        integrated_tg_per_year = report.integrated_tg_per_year,
        "Finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(match args.verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
