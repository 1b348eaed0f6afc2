//! Kinelink suspension-kinematics CLI.
//!
//! Provides two modes of operation:
//! - `solve`: Sweep a linkage over its travel and print the kinematic
//!   table as JSON
//! - `check`: Validate a geometry file and print a summary

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use kinelink_core::prelude::*;
use kinelink_geometry::{parse_file, LinkageGraph};
use kinelink_sweep::analyze;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Rear-suspension linkage kinematics solver.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep the driven input over a travel domain and print the
    /// kinematic table as JSON.
    Solve {
        /// Geometry file (TOML).
        geometry: PathBuf,

        /// Driven quantity; overrides the geometry's [sweep] section.
        #[arg(long)]
        driven: Option<DrivenArg>,

        /// Domain start, mm.
        #[arg(long)]
        start: Option<f64>,

        /// Domain end, mm.
        #[arg(long)]
        end: Option<f64>,

        /// Number of evenly spaced steps, endpoints included.
        #[arg(long)]
        steps: Option<usize>,

        /// Solver configuration file (TOML). Defaults apply otherwise.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the table to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a geometry file and print a summary.
    Check {
        /// Geometry file (TOML).
        geometry: PathBuf,
    },
}

/// CLI spelling of the driven quantity.
#[derive(Clone, Copy, ValueEnum)]
enum DrivenArg {
    WheelTravel,
    ShockTravel,
}

impl From<DrivenArg> for DrivenQuantity {
    fn from(arg: DrivenArg) -> Self {
        match arg {
            DrivenArg::WheelTravel => Self::WheelTravel,
            DrivenArg::ShockTravel => Self::ShockTravel,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn run_solve(
    geometry: &PathBuf,
    driven: Option<DrivenArg>,
    start: Option<f64>,
    end: Option<f64>,
    steps: Option<usize>,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let desc = parse_file(geometry)?;
    let graph = LinkageGraph::build(&desc)?;

    // CLI flags override the geometry's embedded [sweep] section
    // field by field.
    let embedded = desc.sweep;
    let quantity = driven
        .map(DrivenQuantity::from)
        .or(embedded.map(|s| s.driven))
        .ok_or("no driven quantity: pass --driven or add a [sweep] section")?;
    let start = start
        .or(embedded.map(|s| s.start))
        .ok_or("no domain start: pass --start or add a [sweep] section")?;
    let end = end
        .or(embedded.map(|s| s.end))
        .ok_or("no domain end: pass --end or add a [sweep] section")?;
    let steps = steps
        .or(embedded.map(|s| s.steps))
        .ok_or("no step count: pass --steps or add a [sweep] section")?;

    let solver_config = match config {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };

    let domain = SweepDomain::new(quantity, start, end);
    let table = analyze(&graph, &domain, steps, &solver_config)?;

    let json = if pretty {
        serde_json::to_string_pretty(&table)?
    } else {
        serde_json::to_string(&table)?
    };

    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_check(geometry: &PathBuf) -> Result<(), Box<dyn Error>> {
    let desc = parse_file(geometry)?;
    let graph = LinkageGraph::build(&desc)?;

    let name = if desc.name.is_empty() {
        "(unnamed)"
    } else {
        &desc.name
    };
    println!("{name}: ok");
    println!(
        "  pivots: {} ({} moving)",
        graph.pivots().len(),
        graph.moving_count()
    );
    println!("  links: {}", graph.links().len());

    let axle = graph.initial_axle();
    println!("  axle: ({:.3}, {:.3})", axle.x, axle.y);

    match graph.shock() {
        Some(shock) => {
            println!("  shock: length0 = {:.3} mm", shock.length0);
            if let Some(stroke) = shock.stroke {
                println!("  shock stroke: {stroke:.3} mm");
            }
        }
        None => println!("  shock: none"),
    }

    if let Some(sweep) = desc.sweep {
        println!(
            "  sweep: {:?} from {} to {} in {} steps",
            sweep.driven, sweep.start, sweep.end, sweep.steps
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            ref geometry,
            driven,
            start,
            end,
            steps,
            ref config,
            ref output,
            pretty,
        } => run_solve(
            geometry,
            driven,
            start,
            end,
            steps,
            config.as_ref(),
            output.as_ref(),
            pretty,
        ),
        Commands::Check { ref geometry } => run_check(geometry),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
