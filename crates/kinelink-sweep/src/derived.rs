//! Derived motion-ratio quantities from a solved sweep.
//!
//! Everything here is finite-difference post-processing over the
//! converged steps; non-converged steps yield `None` in every series
//! rather than a stale or extrapolated number.

use kinelink_geometry::LinkageGraph;

use crate::sweep::SweepResult;

/// Shock-travel deltas below this are treated as a stationary shock
/// and give no leverage ratio.
const MIN_SHOCK_DELTA: f64 = 1e-9;

/// Index-aligned derived series; every vector has the sweep's length.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    /// Axle displacement along the wheel axis from zero travel, mm.
    pub wheel_travel: Vec<Option<f64>>,
    /// Shock compression from rest length, mm. Mirrors `wheel_travel`
    /// on shockless linkages.
    pub shock_travel: Vec<Option<f64>>,
    /// d(wheel_travel)/d(shock_travel), dimensionless.
    pub leverage_ratio: Vec<Option<f64>>,
    pub axle_x: Vec<Option<f64>>,
    pub axle_y: Vec<Option<f64>>,
    /// Reserved: instant-center coordinates per step. The geometric
    /// construction is not yet pinned down upstream, so these stay
    /// `None`.
    pub instant_center: Vec<Option<(f64, f64)>>,
}

/// Post-process a sweep into derived series.
pub fn derive(graph: &LinkageGraph, result: &SweepResult) -> DerivedSeries {
    let n = result.len();
    let axis = graph.wheel_axis();
    let axle0 = graph.initial_axle();

    let mut wheel_travel = vec![None; n];
    let mut shock_travel = vec![None; n];
    let mut axle_x = vec![None; n];
    let mut axle_y = vec![None; n];

    for (i, sample) in result.samples().iter().enumerate() {
        let Some(state) = sample.outcome.state() else {
            continue;
        };
        let axle = state.position_of(graph, graph.axle());
        axle_x[i] = Some(axle.x);
        axle_y[i] = Some(axle.y);

        let wheel = (axle - axle0).dot(&axis);
        wheel_travel[i] = Some(wheel);

        shock_travel[i] = match graph.shock() {
            Some(shock) => state
                .shock_separation(graph)
                .map(|sep| shock.length0 - sep),
            // No shock: the driven travel is the shock travel, the
            // trivial 1:1 linkage.
            None => Some(wheel),
        };
    }

    let leverage_ratio = leverage_series(&wheel_travel, &shock_travel);

    DerivedSeries {
        wheel_travel,
        shock_travel,
        leverage_ratio,
        axle_x,
        axle_y,
        instant_center: vec![None; n],
    }
}

/// Finite-difference leverage ratio per converged step.
///
/// Central difference over the nearest converged neighbors; the
/// stencil widens past non-converged steps, and degrades to a
/// one-sided difference at the sequence boundaries. `None` when fewer
/// than two converged steps exist or the shock is stationary across
/// the stencil.
fn leverage_series(
    wheel: &[Option<f64>],
    shock: &[Option<f64>],
) -> Vec<Option<f64>> {
    let n = wheel.len();
    let mut out = vec![None; n];

    for i in 0..n {
        if wheel[i].is_none() {
            continue;
        }
        let prev = (0..i).rev().find(|&j| wheel[j].is_some());
        let next = (i + 1..n).find(|&j| wheel[j].is_some());

        let (lo, hi) = match (prev, next) {
            (Some(p), Some(q)) => (p, q),
            (None, Some(q)) => (i, q),
            (Some(p), None) => (p, i),
            (None, None) => continue,
        };

        let (Some(w_lo), Some(w_hi), Some(s_lo), Some(s_hi)) =
            (wheel[lo], wheel[hi], shock[lo], shock[hi])
        else {
            continue;
        };
        let ds = s_hi - s_lo;
        if ds.abs() < MIN_SHOCK_DELTA {
            continue;
        }
        out[i] = Some((w_hi - w_lo) / ds);
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
