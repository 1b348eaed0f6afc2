//! Declarative linkage descriptions parsed from TOML.
//!
//! Converts on-disk geometry files into the crate's canonical
//! [`LinkageDescriptor`] representation. Structural validation (DOF
//! counting, reference resolution) happens later in
//! [`LinkageGraph::build`](crate::graph::LinkageGraph::build); this
//! module only owns the input shape.

use std::path::Path;

use serde::{Deserialize, Serialize};

use kinelink_core::error::GeometryError;
use kinelink_core::types::DrivenQuantity;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_scale() -> f64 {
    1.0
}
const fn default_wheel_axis() -> [f64; 2] {
    [0.0, 1.0]
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a linkage geometry file from disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<LinkageDescriptor, GeometryError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| GeometryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a linkage geometry TOML string.
pub fn parse_string(toml_str: &str) -> Result<LinkageDescriptor, GeometryError> {
    toml::from_str(toml_str).map_err(|e| GeometryError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Descriptor types
// ---------------------------------------------------------------------------

/// Whether a pivot is frame-attached or solved each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    /// Frame-attached: coordinates are constant for the whole sweep.
    Fixed,
    /// Solved at every travel step.
    Moving,
}

/// A labeled 2D point of the linkage, in mm (before `scale`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotDescriptor {
    pub id: String,
    pub kind: PivotKind,
    pub x: f64,
    pub y: f64,
}

/// A rigid connection between two pivots. The length is frozen from
/// the initial coordinates at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub a: String,
    pub b: String,
}

/// How a rigid body contributes to the constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// A moving bar; its segments become rigid links.
    #[default]
    Bar,
    /// A frame member; its segments become links and its pivots are
    /// pinned regardless of their declared kind.
    Fixed,
}

/// A multi-pivot rigid body described as an ordered polyline.
///
/// Expands into one link per consecutive pivot pair, plus a closing
/// segment when `closed`. A closed triangle is the canonical rigid
/// rocker; an open polyline leaves its interior pivots hinged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub id: String,
    #[serde(default)]
    pub kind: BodyKind,
    pub points: Vec<String>,
    #[serde(default)]
    pub closed: bool,
}

/// The shock absorber, measured (and optionally driven) between two
/// pivots. Not a rigid link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockDescriptor {
    pub a: String,
    pub b: String,
    /// Eye-to-eye length at zero stroke, mm. Defaults to the distance
    /// between the endpoints in the initial geometry.
    #[serde(default)]
    pub length0: Option<f64>,
    /// Total stroke, mm. Informational; sweep domains are requested
    /// explicitly.
    #[serde(default)]
    pub stroke: Option<f64>,
}

/// Default sweep request embedded in a geometry file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepDescriptor {
    pub driven: DrivenQuantity,
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

/// Complete declarative description of a rear-suspension linkage.
///
/// All coordinates and lengths are millimeters after `scale` (mm per
/// source unit) is applied; geometries traced from imagery set `scale`
/// once instead of rescaling every coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageDescriptor {
    #[serde(default)]
    pub name: String,

    /// Which pivot is the rear axle.
    pub axle: String,

    /// mm per source coordinate unit (default: 1.0).
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Direction of positive wheel travel (default: [0, 1], i.e. +Y
    /// up). Normalized at build time.
    #[serde(default = "default_wheel_axis")]
    pub wheel_axis: [f64; 2],

    pub pivots: Vec<PivotDescriptor>,

    #[serde(default)]
    pub links: Vec<LinkDescriptor>,

    #[serde(default)]
    pub bodies: Vec<BodyDescriptor>,

    #[serde(default)]
    pub shock: Option<ShockDescriptor>,

    #[serde(default)]
    pub sweep: Option<SweepDescriptor>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_PIVOT: &str = r#"
        name = "single-pivot"
        axle = "axle"

        [[pivots]]
        id = "main"
        kind = "fixed"
        x = 0.0
        y = 0.0

        [[pivots]]
        id = "axle"
        kind = "moving"
        x = 430.0
        y = 0.0

        [[links]]
        a = "main"
        b = "axle"
    "#;

    #[test]
    fn parse_single_pivot() {
        let desc = parse_string(SINGLE_PIVOT).unwrap();
        assert_eq!(desc.name, "single-pivot");
        assert_eq!(desc.axle, "axle");
        assert_eq!(desc.pivots.len(), 2);
        assert_eq!(desc.links.len(), 1);
        assert!(desc.shock.is_none());
        assert!(desc.bodies.is_empty());
        assert!((desc.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(desc.wheel_axis, [0.0, 1.0]);
    }

    #[test]
    fn parse_shock_and_sweep_sections() {
        let desc = parse_string(
            r#"
            axle = "axle"

            [[pivots]]
            id = "main"
            kind = "fixed"
            x = 0.0
            y = 0.0

            [[pivots]]
            id = "axle"
            kind = "moving"
            x = 430.0
            y = 0.0

            [[links]]
            a = "main"
            b = "axle"

            [shock]
            a = "main"
            b = "axle"
            length0 = 210.0
            stroke = 55.0

            [sweep]
            driven = "shock_travel"
            start = 0.0
            end = 55.0
            steps = 61
        "#,
        )
        .unwrap();

        let shock = desc.shock.unwrap();
        assert_eq!(shock.a, "main");
        assert_eq!(shock.length0, Some(210.0));
        assert_eq!(shock.stroke, Some(55.0));

        let sweep = desc.sweep.unwrap();
        assert_eq!(sweep.driven, DrivenQuantity::ShockTravel);
        assert_eq!(sweep.steps, 61);
    }

    #[test]
    fn parse_bodies() {
        let desc = parse_string(
            r#"
            axle = "axle"

            [[pivots]]
            id = "a"
            kind = "fixed"
            x = 0.0
            y = 0.0

            [[pivots]]
            id = "axle"
            kind = "moving"
            x = 1.0
            y = 0.0

            [[bodies]]
            id = "rocker"
            points = ["a", "axle"]
            closed = false
        "#,
        )
        .unwrap();
        assert_eq!(desc.bodies.len(), 1);
        assert_eq!(desc.bodies[0].kind, BodyKind::Bar);
        assert_eq!(desc.bodies[0].points, vec!["a", "axle"]);
    }

    #[test]
    fn parse_rejects_missing_axle_field() {
        let err = parse_string("pivots = []").unwrap_err();
        assert!(matches!(err, GeometryError::Parse(_)));
    }

    #[test]
    fn parse_rejects_bad_toml() {
        assert!(matches!(
            parse_string("this is not toml ["),
            Err(GeometryError::Parse(_))
        ));
    }

    #[test]
    fn parse_file_missing_path_is_io_error() {
        let err = parse_file("/nonexistent/bike.toml").unwrap_err();
        assert!(matches!(err, GeometryError::Io { .. }));
    }
}
