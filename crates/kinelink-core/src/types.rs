use serde::{Deserialize, Serialize};

use crate::error::SweepError;

// ---------------------------------------------------------------------------
// StepStatus
// ---------------------------------------------------------------------------

/// Outcome of the constraint solve at one travel step.
///
/// Non-`Converged` steps stay in the sweep (the travel index is
/// preserved) but contribute no derived values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Residual norm fell below tolerance within the iteration budget.
    Converged,
    /// Iteration budget exhausted without convergence.
    Diverged,
    /// Singular Jacobian: kinematic dead center, locally indeterminate.
    Degenerate,
}

impl StepStatus {
    pub const fn is_converged(self) -> bool {
        matches!(self, Self::Converged)
    }
}

// ---------------------------------------------------------------------------
// DrivenQuantity
// ---------------------------------------------------------------------------

/// The single externally driven degree of freedom of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivenQuantity {
    /// Axle displacement along the declared wheel-travel axis, mm.
    WheelTravel,
    /// Shock compression from its rest eye-to-eye length, mm.
    ShockTravel,
}

// ---------------------------------------------------------------------------
// SweepDomain
// ---------------------------------------------------------------------------

/// Travel range for one sweep: which quantity is driven and over what
/// interval (inclusive of both ends, increasing or decreasing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepDomain {
    pub quantity: DrivenQuantity,
    pub start: f64,
    pub end: f64,
}

impl SweepDomain {
    pub const fn new(quantity: DrivenQuantity, start: f64, end: f64) -> Self {
        Self {
            quantity,
            start,
            end,
        }
    }

    /// Validate bounds: finite and distinct.
    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start == self.end {
            return Err(SweepError::InvalidDomain {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// The i-th of `step_count` evenly spaced samples over the domain.
    ///
    /// Endpoints are exact: sample 0 is `start`, sample
    /// `step_count - 1` is `end`.
    pub fn sample(&self, i: usize, step_count: usize) -> f64 {
        debug_assert!(step_count >= 2 && i < step_count);
        if i == step_count - 1 {
            return self.end;
        }
        let t = i as f64 / (step_count - 1) as f64;
        self.start + (self.end - self.start) * t
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_status_is_converged() {
        assert!(StepStatus::Converged.is_converged());
        assert!(!StepStatus::Diverged.is_converged());
        assert!(!StepStatus::Degenerate.is_converged());
    }

    #[test]
    fn step_status_serde_snake_case() {
        let json = serde_json::to_string(&StepStatus::Degenerate).unwrap();
        assert_eq!(json, "\"degenerate\"");
        let back: StepStatus = serde_json::from_str("\"converged\"").unwrap();
        assert_eq!(back, StepStatus::Converged);
    }

    #[test]
    fn driven_quantity_serde_snake_case() {
        let json = serde_json::to_string(&DrivenQuantity::WheelTravel).unwrap();
        assert_eq!(json, "\"wheel_travel\"");
    }

    #[test]
    fn domain_validate_ok_both_directions() {
        assert!(SweepDomain::new(DrivenQuantity::WheelTravel, 0.0, 150.0)
            .validate()
            .is_ok());
        assert!(SweepDomain::new(DrivenQuantity::ShockTravel, 55.0, 0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn domain_validate_rejects_equal_bounds() {
        let err = SweepDomain::new(DrivenQuantity::WheelTravel, 10.0, 10.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidDomain { .. }));
    }

    #[test]
    fn domain_validate_rejects_non_finite() {
        assert!(SweepDomain::new(DrivenQuantity::WheelTravel, 0.0, f64::INFINITY)
            .validate()
            .is_err());
        assert!(SweepDomain::new(DrivenQuantity::WheelTravel, f64::NAN, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn domain_samples_are_inclusive_and_even() {
        let d = SweepDomain::new(DrivenQuantity::WheelTravel, 0.0, 100.0);
        assert!((d.sample(0, 5) - 0.0).abs() < f64::EPSILON);
        assert!((d.sample(2, 5) - 50.0).abs() < f64::EPSILON);
        assert!((d.sample(4, 5) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn domain_samples_decreasing() {
        let d = SweepDomain::new(DrivenQuantity::ShockTravel, 60.0, 0.0);
        assert!((d.sample(0, 3) - 60.0).abs() < f64::EPSILON);
        assert!((d.sample(1, 3) - 30.0).abs() < f64::EPSILON);
        assert!((d.sample(2, 3) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn domain_endpoint_is_exact() {
        let d = SweepDomain::new(DrivenQuantity::WheelTravel, 0.0, 0.1);
        // The last sample must be bit-identical to `end`.
        assert_eq!(d.sample(6, 7), 0.1);
    }
}
