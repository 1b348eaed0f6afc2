// kinelink-core: Types, config, and errors for kinelink suspension kinematics.

pub mod config;
pub mod error;
pub mod types;

pub mod prelude {
    pub use crate::config::SolverConfig;
    pub use crate::error::{ConfigError, GeometryError, KinelinkError, SweepError};
    pub use crate::types::{DrivenQuantity, StepStatus, SweepDomain};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn prelude_covers_the_public_surface() {
        assert!(SolverConfig::default().validate().is_ok());
        let domain = SweepDomain::new(DrivenQuantity::WheelTravel, 0.0, 1.0);
        assert!(domain.validate().is_ok());
        assert!(StepStatus::Converged.is_converged());
        let err: KinelinkError = ConfigError::ZeroIterations.into();
        assert!(matches!(err, KinelinkError::Config(_)));
    }
}
