//! Travel sweeps over a linkage and their derived kinematic datasets.
//!
//! Drives the constraint solver across an evenly spaced travel domain,
//! post-processes the solved pose sequence into motion-ratio
//! quantities, and assembles everything into index-aligned arrays for
//! the caller.
//!
//! # Architecture
//!
//! ```text
//! LinkageGraph ──► sweep ──► SweepResult ──► derive ──► KinematicTable
//! ```
//!
//! A sweep is sequentially dependent (each step seeds the next), so it
//! runs on one thread; independent sweeps share nothing and can run on
//! as many threads as the caller likes.

pub mod derived;
pub mod sweep;
pub mod table;

pub use derived::{derive, DerivedSeries};
pub use sweep::{sweep, StepOutcome, SweepResult, SweepSample};
pub use table::KinematicTable;

use kinelink_core::config::SolverConfig;
use kinelink_core::error::KinelinkError;
use kinelink_core::types::SweepDomain;
use kinelink_geometry::LinkageGraph;

/// Run a full sweep and assemble the kinematic table in one call.
///
/// This is the whole pipeline behind a single "analyze this linkage"
/// request; it is pure and deterministic.
pub fn analyze(
    graph: &LinkageGraph,
    domain: &SweepDomain,
    step_count: usize,
    config: &SolverConfig,
) -> Result<KinematicTable, KinelinkError> {
    let result = sweep(graph, domain, step_count, config)?;
    Ok(KinematicTable::from_sweep(graph, &result))
}
