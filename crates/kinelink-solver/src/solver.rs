//! Newton iteration on the stacked constraint-residual vector.
//!
//! One residual per effective link ("distance between endpoints equals
//! the frozen length") plus one residual pinning the driven input,
//! linearized with the analytic Jacobian and solved by LU
//! decomposition. The system is square by construction: the geometry
//! model only admits graphs whose DOF budget is exactly the single
//! driven input.

use nalgebra::{DMatrix, DVector, Point2};

use kinelink_core::config::SolverConfig;
use kinelink_geometry::LinkageGraph;

/// Below this separation a link direction is undefined and its
/// Jacobian row is left zero.
const MIN_SEPARATION: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Solver input/output types
// ---------------------------------------------------------------------------

/// The driven-input equation for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrivenTarget {
    /// Axle displacement along the graph's wheel axis equals this
    /// value (mm).
    WheelTravel(f64),
    /// Shock eye-to-eye separation equals this value (mm). Callers
    /// driving shock *travel* convert via `length0 - travel`.
    ShockSeparation(f64),
}

/// Solved positions of all moving pivots at one driven-input value,
/// in the graph's unknown-slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelState {
    positions: Vec<Point2<f64>>,
}

impl TravelState {
    /// Wrap slot-ordered positions. The sweep uses this to seed step 0
    /// from the graph's initial coordinates.
    pub fn new(positions: Vec<Point2<f64>>) -> Self {
        Self { positions }
    }

    /// Positions in unknown-slot order.
    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }

    /// Position of an arena pivot: solved if moving, initial if fixed.
    pub fn position_of(&self, graph: &LinkageGraph, pivot: usize) -> Point2<f64> {
        match graph.slot_of(pivot) {
            Some(slot) => self.positions[slot],
            None => graph.pivots()[pivot].initial,
        }
    }

    /// Shock eye-to-eye separation in this state, if the graph has a
    /// shock.
    pub fn shock_separation(&self, graph: &LinkageGraph) -> Option<f64> {
        graph
            .shock()
            .map(|s| (self.position_of(graph, s.a) - self.position_of(graph, s.b)).norm())
    }
}

/// Why a single-step solve produced no state.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SolveFailure {
    /// Iteration budget exhausted with the residual still above
    /// tolerance.
    #[error("no convergence after {iterations} iterations (residual {residual:.3e})")]
    Diverged { iterations: u32, residual: f64 },

    /// The Jacobian lost rank: kinematic dead center. Callers treat
    /// this as a travel-domain boundary, not a programming error.
    #[error("singular configuration at iteration {iteration}")]
    Degenerate { iteration: u32 },
}

// ---------------------------------------------------------------------------
// solve_pose
// ---------------------------------------------------------------------------

/// Solve the linkage pose for one driven-input value.
///
/// `seed` selects the solution branch: Newton converges to the root
/// nearest it, which is what keeps a travel sweep on one physically
/// continuous branch when each step is seeded from the previous
/// solution.
///
/// Pure and deterministic: identical inputs give identical output.
pub fn solve_pose(
    graph: &LinkageGraph,
    target: DrivenTarget,
    seed: &TravelState,
    config: &SolverConfig,
) -> Result<TravelState, SolveFailure> {
    let n_unknowns = 2 * graph.moving_count();
    let n_equations = graph.links().len() + 1;
    debug_assert_eq!(n_unknowns, n_equations, "graph DOF budget violated");

    let mut x = DVector::<f64>::zeros(n_unknowns);
    for (slot, p) in seed.positions().iter().enumerate() {
        x[2 * slot] = p.x;
        x[2 * slot + 1] = p.y;
    }

    let mut residual = DVector::<f64>::zeros(n_equations);
    let mut jacobian = DMatrix::<f64>::zeros(n_equations, n_unknowns);

    // The budget counts Newton updates; the seed and every updated
    // iterate get a convergence check, the last update included.
    fill_system(graph, target, &x, &mut residual, &mut jacobian);
    let mut norm = residual.norm();
    if norm < config.tolerance {
        return Ok(state_from_vector(graph, &x));
    }

    for iteration in 0..config.max_iterations {
        let Some(step) = jacobian.clone().lu().solve(&(-&residual)) else {
            return Err(SolveFailure::Degenerate { iteration });
        };
        if step.iter().any(|v| !v.is_finite()) {
            return Err(SolveFailure::Degenerate { iteration });
        }
        x += step;

        fill_system(graph, target, &x, &mut residual, &mut jacobian);
        norm = residual.norm();
        if norm < config.tolerance {
            return Ok(state_from_vector(graph, &x));
        }
    }

    Err(SolveFailure::Diverged {
        iterations: config.max_iterations,
        residual: norm,
    })
}

// ---------------------------------------------------------------------------
// System assembly
// ---------------------------------------------------------------------------

fn position(graph: &LinkageGraph, x: &DVector<f64>, pivot: usize) -> Point2<f64> {
    match graph.slot_of(pivot) {
        Some(slot) => Point2::new(x[2 * slot], x[2 * slot + 1]),
        None => graph.pivots()[pivot].initial,
    }
}

/// Residual and Jacobian row of one distance constraint
/// `‖pa − pb‖ = target_len`, written into row `row`.
fn distance_row(
    graph: &LinkageGraph,
    x: &DVector<f64>,
    a: usize,
    b: usize,
    target_len: f64,
    row: usize,
    residual: &mut DVector<f64>,
    jacobian: &mut DMatrix<f64>,
) {
    let pa = position(graph, x, a);
    let pb = position(graph, x, b);
    let d = pa - pb;
    let dist = d.norm();
    residual[row] = dist - target_len;

    if dist < MIN_SEPARATION {
        return;
    }
    let u = d / dist;
    if let Some(slot) = graph.slot_of(a) {
        jacobian[(row, 2 * slot)] = u.x;
        jacobian[(row, 2 * slot + 1)] = u.y;
    }
    if let Some(slot) = graph.slot_of(b) {
        jacobian[(row, 2 * slot)] = -u.x;
        jacobian[(row, 2 * slot + 1)] = -u.y;
    }
}

fn fill_system(
    graph: &LinkageGraph,
    target: DrivenTarget,
    x: &DVector<f64>,
    residual: &mut DVector<f64>,
    jacobian: &mut DMatrix<f64>,
) {
    jacobian.fill(0.0);

    for (row, link) in graph.links().iter().enumerate() {
        distance_row(graph, x, link.a, link.b, link.length, row, residual, jacobian);
    }

    let driven_row = graph.links().len();
    match target {
        DrivenTarget::WheelTravel(travel) => {
            let axis = graph.wheel_axis();
            let axle = position(graph, x, graph.axle());
            residual[driven_row] = (axle - graph.initial_axle()).dot(&axis) - travel;
            // The axle is validated to be moving.
            if let Some(slot) = graph.slot_of(graph.axle()) {
                jacobian[(driven_row, 2 * slot)] = axis.x;
                jacobian[(driven_row, 2 * slot + 1)] = axis.y;
            }
        }
        DrivenTarget::ShockSeparation(separation) => {
            // The geometry model guarantees a shock exists before a
            // shock-driven sweep is accepted.
            if let Some(shock) = graph.shock() {
                distance_row(
                    graph, x, shock.a, shock.b, separation, driven_row, residual, jacobian,
                );
            }
        }
    }
}

fn state_from_vector(graph: &LinkageGraph, x: &DVector<f64>) -> TravelState {
    let positions = (0..graph.moving_count())
        .map(|slot| Point2::new(x[2 * slot], x[2 * slot + 1]))
        .collect();
    TravelState::new(positions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
