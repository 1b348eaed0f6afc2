//! Newton constraint solver for linkage graphs.
//!
//! Solves the closed-chain pose problem: given a validated
//! [`LinkageGraph`](kinelink_geometry::LinkageGraph) and one driven
//! input value, find positions for all moving pivots that satisfy
//! every rigid-link distance constraint.
//!
//! # Architecture
//!
//! ```text
//! LinkageGraph + DrivenTarget + seed ──► solve_pose ──► TravelState
//! ```
//!
//! The solve is a pure function with no retained state; callers supply
//! the seed, which doubles as the branch selector (closed loops admit
//! two solution branches, and Newton converges to the one nearest the
//! seed).

pub mod solver;

pub use solver::{solve_pose, DrivenTarget, SolveFailure, TravelState};
