//! The travel stepper: discretizes the domain and drives the solver.
//!
//! Continuity policy: step 0 is seeded with the declared zero-travel
//! coordinates; every later step is seeded with the last *converged*
//! state. The constraint equations are generically two-valued
//! (elbow-up/elbow-down), and seeding from the previous solution is
//! what keeps the sweep on one physical branch. A failed step records
//! its status and the sweep continues from the last good seed, so an
//! isolated dead spot does not poison the rest of the travel range.

use kinelink_core::config::SolverConfig;
use kinelink_core::error::{GeometryError, KinelinkError, SweepError};
use kinelink_core::types::{DrivenQuantity, StepStatus, SweepDomain};
use kinelink_geometry::LinkageGraph;
use kinelink_solver::{solve_pose, DrivenTarget, SolveFailure, TravelState};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Per-step outcome. The tagged variants force the post-processor to
/// handle failures explicitly instead of reading stale positions.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Converged(TravelState),
    Diverged,
    Degenerate,
}

impl StepOutcome {
    pub const fn status(&self) -> StepStatus {
        match self {
            Self::Converged(_) => StepStatus::Converged,
            Self::Diverged => StepStatus::Diverged,
            Self::Degenerate => StepStatus::Degenerate,
        }
    }

    pub const fn state(&self) -> Option<&TravelState> {
        match self {
            Self::Converged(state) => Some(state),
            _ => None,
        }
    }
}

/// One entry of a sweep: the driven-input value and what the solver
/// made of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSample {
    pub driven_value: f64,
    pub outcome: StepOutcome,
}

/// Ordered solve outcomes over one travel domain. Consumed read-only
/// by the post-processor; nothing is retained between invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub domain: SweepDomain,
    samples: Vec<SweepSample>,
}

impl SweepResult {
    pub fn samples(&self) -> &[SweepSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// sweep
// ---------------------------------------------------------------------------

/// Sweep the driven input over `[start, end]` in `step_count`
/// inclusive, evenly spaced steps.
///
/// Fatal errors (bad step count, bad domain, shock-driven sweep on a
/// shockless linkage) abort before any solving; per-step solve
/// failures are recorded in the samples and never abort.
pub fn sweep(
    graph: &LinkageGraph,
    domain: &SweepDomain,
    step_count: usize,
    config: &SolverConfig,
) -> Result<SweepResult, KinelinkError> {
    config.validate()?;
    domain.validate()?;
    if step_count < 2 {
        return Err(SweepError::InvalidStepCount(step_count).into());
    }
    if domain.quantity == DrivenQuantity::ShockTravel && graph.shock().is_none() {
        return Err(GeometryError::InvalidShock(
            "shock_travel driven but no shock declared".to_string(),
        )
        .into());
    }

    let mut samples = Vec::with_capacity(step_count);
    let mut seed = TravelState::new(graph.initial_positions());

    for i in 0..step_count {
        let driven_value = domain.sample(i, step_count);
        let target = match domain.quantity {
            DrivenQuantity::WheelTravel => DrivenTarget::WheelTravel(driven_value),
            DrivenQuantity::ShockTravel => {
                // Shock travel is compression from rest length.
                let length0 = graph.shock().map_or(0.0, |s| s.length0);
                DrivenTarget::ShockSeparation(length0 - driven_value)
            }
        };

        let outcome = match solve_pose(graph, target, &seed, config) {
            Ok(state) => {
                seed = state.clone();
                StepOutcome::Converged(state)
            }
            Err(SolveFailure::Diverged { .. }) => StepOutcome::Diverged,
            Err(SolveFailure::Degenerate { .. }) => StepOutcome::Degenerate,
        };
        samples.push(SweepSample {
            driven_value,
            outcome,
        });
    }

    Ok(SweepResult {
        domain: *domain,
        samples,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
