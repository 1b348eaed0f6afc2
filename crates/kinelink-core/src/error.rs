use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the kinelink workspace.
#[derive(Debug, Error)]
pub enum KinelinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),
}

/// Solver configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid tolerance: {0} (must be > 0 and finite)")]
    InvalidTolerance(f64),

    #[error("Invalid max_iterations: 0 (must be >= 1)")]
    ZeroIterations,
}

/// Linkage construction errors. All are fatal: no solve is attempted
/// on a geometry that fails validation.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Failed to read a geometry file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse geometry TOML content.
    #[error("geometry parse error: {0}")]
    Parse(String),

    /// A link, body, shock, or axle designation names a pivot that
    /// does not exist.
    #[error("unknown pivot: {0}")]
    UnknownPivot(String),

    /// Two pivots share the same identifier.
    #[error("duplicate pivot id: {0}")]
    DuplicatePivotId(String),

    /// Two links join the same pivot pair.
    #[error("duplicate link between {a} and {b}")]
    DuplicateLink { a: String, b: String },

    /// A link joins a pivot to itself.
    #[error("link joins pivot {0} to itself")]
    SelfLink(String),

    /// A link's endpoints coincide, so no rigid length can be frozen.
    #[error("zero-length link between {a} and {b}")]
    ZeroLengthLink { a: String, b: String },

    /// A pivot coordinate is NaN or infinite.
    #[error("non-finite coordinate on pivot {0}")]
    NonFiniteCoordinate(String),

    /// The coordinate scale factor is not a positive finite number.
    #[error("invalid scale: {0} (must be > 0 and finite)")]
    InvalidScale(f64),

    /// No axle pivot was designated.
    #[error("no axle pivot designated")]
    MissingAxle,

    /// The designated axle pivot is not a moving pivot.
    #[error("axle pivot {0} must be a moving pivot")]
    InvalidAxle(String),

    /// The shock pair cannot act as a driver (e.g. both ends fixed).
    #[error("invalid shock: {0}")]
    InvalidShock(String),

    /// More degrees of freedom than the single driven input.
    #[error("underconstrained linkage: {dof} free degrees of freedom beyond the driven input")]
    Underconstrained { dof: i32 },

    /// More constraints than degrees of freedom.
    #[error("overconstrained linkage: {excess} excess constraints")]
    Overconstrained { excess: i32 },
}

/// Sweep request errors. Fatal to the whole request; per-step solve
/// failures are recorded in the step status instead.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid step count: {0} (must be >= 2)")]
    InvalidStepCount(usize),

    #[error("invalid sweep domain [{start}, {end}]: bounds must be finite and distinct")]
    InvalidDomain { start: f64, end: f64 },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinelink_error_from_geometry_error() {
        let err = GeometryError::MissingAxle;
        let top: KinelinkError = err.into();
        assert!(matches!(top, KinelinkError::Geometry(_)));
        assert!(top.to_string().contains("axle"));
    }

    #[test]
    fn kinelink_error_from_sweep_error() {
        let err = SweepError::InvalidStepCount(1);
        let top: KinelinkError = err.into();
        assert!(matches!(top, KinelinkError::Sweep(_)));
    }

    #[test]
    fn kinelink_error_from_config_error() {
        let err = ConfigError::ZeroIterations;
        let top: KinelinkError = err.into();
        assert!(matches!(top, KinelinkError::Config(_)));
    }

    #[test]
    fn geometry_error_display_messages() {
        assert_eq!(
            GeometryError::UnknownPivot("axle".into()).to_string(),
            "unknown pivot: axle"
        );
        assert_eq!(
            GeometryError::DuplicatePivotId("bb".into()).to_string(),
            "duplicate pivot id: bb"
        );
        assert_eq!(
            GeometryError::DuplicateLink {
                a: "bb".into(),
                b: "axle".into()
            }
            .to_string(),
            "duplicate link between bb and axle"
        );
        assert_eq!(
            GeometryError::SelfLink("axle".into()).to_string(),
            "link joins pivot axle to itself"
        );
        assert_eq!(
            GeometryError::ZeroLengthLink {
                a: "p1".into(),
                b: "p2".into()
            }
            .to_string(),
            "zero-length link between p1 and p2"
        );
        assert_eq!(
            GeometryError::Underconstrained { dof: 2 }.to_string(),
            "underconstrained linkage: 2 free degrees of freedom beyond the driven input"
        );
        assert_eq!(
            GeometryError::Overconstrained { excess: 1 }.to_string(),
            "overconstrained linkage: 1 excess constraints"
        );
        assert_eq!(
            GeometryError::InvalidAxle("bb".into()).to_string(),
            "axle pivot bb must be a moving pivot"
        );
    }

    #[test]
    fn sweep_error_display_messages() {
        assert_eq!(
            SweepError::InvalidStepCount(0).to_string(),
            "invalid step count: 0 (must be >= 2)"
        );
        assert_eq!(
            SweepError::InvalidDomain {
                start: 0.0,
                end: 0.0
            }
            .to_string(),
            "invalid sweep domain [0, 0]: bounds must be finite and distinct"
        );
    }

    #[test]
    fn io_error_includes_path() {
        let e = GeometryError::Io {
            path: PathBuf::from("/tmp/bike.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/bike.toml"));
        assert!(msg.contains("not found"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<KinelinkError>();
        assert_send_sync::<GeometryError>();
        assert_send_sync::<SweepError>();
    }
}
