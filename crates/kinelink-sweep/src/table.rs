//! The result assembler: travel-index-aligned named arrays.
//!
//! The table is the external boundary of the core. Its sole shape
//! contract: every array has the sweep's length, and index i means
//! "the i-th travel step" in every one of them. Missing values stay
//! missing (`null` in JSON), never zero-filled.

use serde::{Deserialize, Serialize};

use kinelink_core::types::StepStatus;
use kinelink_geometry::LinkageGraph;

use crate::derived::derive;
use crate::sweep::SweepResult;

/// Per-step kinematic dataset for one sweep. All lengths in mm,
/// leverage ratio dimensionless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicTable {
    /// The driven-input value at each step.
    pub driven: Vec<f64>,
    /// Solve status at each step.
    pub status: Vec<StepStatus>,
    pub wheel_travel: Vec<Option<f64>>,
    pub shock_travel: Vec<Option<f64>>,
    pub leverage_ratio: Vec<Option<f64>>,
    pub axle_x: Vec<Option<f64>>,
    pub axle_y: Vec<Option<f64>>,
    /// Reserved for the instant-center extension; always `None` in
    /// this version.
    pub instant_center_x: Vec<Option<f64>>,
    pub instant_center_y: Vec<Option<f64>>,
}

impl KinematicTable {
    /// Assemble the table from a finished sweep.
    pub fn from_sweep(graph: &LinkageGraph, result: &SweepResult) -> Self {
        let series = derive(graph, result);
        let (ic_x, ic_y) = series
            .instant_center
            .iter()
            .map(|p| (p.map(|(x, _)| x), p.map(|(_, y)| y)))
            .unzip();

        Self {
            driven: result.samples().iter().map(|s| s.driven_value).collect(),
            status: result
                .samples()
                .iter()
                .map(|s| s.outcome.status())
                .collect(),
            wheel_travel: series.wheel_travel,
            shock_travel: series.shock_travel,
            leverage_ratio: series.leverage_ratio,
            axle_x: series.axle_x,
            axle_y: series.axle_y,
            instant_center_x: ic_x,
            instant_center_y: ic_y,
        }
    }

    /// Number of travel steps.
    pub fn len(&self) -> usize {
        self.driven.len()
    }

    pub fn is_empty(&self) -> bool {
        self.driven.is_empty()
    }

    /// Whether every array carries one entry per travel step.
    pub fn is_aligned(&self) -> bool {
        let n = self.driven.len();
        self.status.len() == n
            && self.wheel_travel.len() == n
            && self.shock_travel.len() == n
            && self.leverage_ratio.len() == n
            && self.axle_x.len() == n
            && self.axle_y.len() == n
            && self.instant_center_x.len() == n
            && self.instant_center_y.len() == n
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
