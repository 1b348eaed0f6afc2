//! The validated, immutable linkage graph.
//!
//! Pivots live in a fixed arena and are referenced by index from
//! links, so closed kinematic loops (cyclic in topology) stay acyclic
//! in ownership. Link lengths are computed once from the initial
//! coordinates and held rigid for every solve.

use nalgebra::{Point2, Vector2};

use kinelink_core::error::GeometryError;

use crate::descriptor::{BodyKind, LinkageDescriptor, PivotKind};

/// Links shorter than this cannot freeze a meaningful direction.
const MIN_LINK_LENGTH: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Arena entries
// ---------------------------------------------------------------------------

/// A pivot in the arena: its label, kind, and zero-travel position.
#[derive(Debug, Clone)]
pub struct Pivot {
    pub id: String,
    pub kind: PivotKind,
    /// Position at zero travel, mm.
    pub initial: Point2<f64>,
}

impl Pivot {
    pub const fn is_fixed(&self) -> bool {
        matches!(self.kind, PivotKind::Fixed)
    }
}

/// A rigid link between two arena pivots with a frozen length.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    /// Rigid length, mm, frozen from the initial geometry.
    pub length: f64,
}

/// The shock absorber between two arena pivots. Not a rigid link;
/// its eye-to-eye separation varies with travel.
#[derive(Debug, Clone, Copy)]
pub struct ShockSpec {
    pub a: usize,
    pub b: usize,
    /// Eye-to-eye length at zero stroke, mm.
    pub length0: f64,
    /// Declared total stroke, mm, if any.
    pub stroke: Option<f64>,
}

// ---------------------------------------------------------------------------
// LinkageGraph
// ---------------------------------------------------------------------------

/// Validated linkage: pivot arena, rigid links, axle and shock
/// designations. Immutable once built; one graph can back any number
/// of concurrent sweeps.
#[derive(Debug, Clone)]
pub struct LinkageGraph {
    pivots: Vec<Pivot>,
    /// Links with at least one moving endpoint. Fixed-fixed segments
    /// constrain nothing and are dropped at build time.
    links: Vec<Link>,
    /// Arena index of each moving pivot, in unknown-vector order.
    moving: Vec<usize>,
    /// Arena index -> slot in `moving`, for moving pivots.
    slot: Vec<Option<usize>>,
    axle: usize,
    shock: Option<ShockSpec>,
    wheel_axis: Vector2<f64>,
}

impl LinkageGraph {
    /// Build and validate a graph from a descriptor.
    ///
    /// Freezes link lengths, applies `scale`, expands rigid bodies
    /// into link segments, and checks the degree-of-freedom budget:
    /// the moving pivots must be exactly determined by the links plus
    /// one driven input.
    pub fn build(desc: &LinkageDescriptor) -> Result<Self, GeometryError> {
        if !(desc.scale > 0.0 && desc.scale.is_finite()) {
            return Err(GeometryError::InvalidScale(desc.scale));
        }

        // Arena with unique ids and finite, scaled coordinates.
        let mut pivots: Vec<Pivot> = Vec::with_capacity(desc.pivots.len());
        for p in &desc.pivots {
            if pivots.iter().any(|q| q.id == p.id) {
                return Err(GeometryError::DuplicatePivotId(p.id.clone()));
            }
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate(p.id.clone()));
            }
            pivots.push(Pivot {
                id: p.id.clone(),
                kind: p.kind,
                initial: Point2::new(p.x * desc.scale, p.y * desc.scale),
            });
        }
        let index_of = |pivots: &[Pivot], id: &str| -> Result<usize, GeometryError> {
            pivots
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| GeometryError::UnknownPivot(id.to_string()))
        };

        // Collect link segments: explicit links, then body expansions.
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for l in &desc.links {
            pairs.push((index_of(&pivots, &l.a)?, index_of(&pivots, &l.b)?));
        }
        for body in &desc.bodies {
            let ids: Vec<usize> = body
                .points
                .iter()
                .map(|p| index_of(&pivots, p))
                .collect::<Result<_, _>>()?;
            if body.kind == BodyKind::Fixed {
                // Frame members pin their pivots outright.
                for &i in &ids {
                    pivots[i].kind = PivotKind::Fixed;
                }
            }
            for w in ids.windows(2) {
                pairs.push((w[0], w[1]));
            }
            if body.closed && ids.len() > 2 {
                pairs.push((ids[ids.len() - 1], ids[0]));
            }
        }

        // Freeze lengths, rejecting duplicates and degenerate links.
        let mut links: Vec<Link> = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            if a == b {
                return Err(GeometryError::SelfLink(pivots[a].id.clone()));
            }
            let dup = links
                .iter()
                .any(|l| (l.a, l.b) == (a, b) || (l.a, l.b) == (b, a));
            if dup {
                return Err(GeometryError::DuplicateLink {
                    a: pivots[a].id.clone(),
                    b: pivots[b].id.clone(),
                });
            }
            let length = (pivots[a].initial - pivots[b].initial).norm();
            if length < MIN_LINK_LENGTH {
                return Err(GeometryError::ZeroLengthLink {
                    a: pivots[a].id.clone(),
                    b: pivots[b].id.clone(),
                });
            }
            links.push(Link { a, b, length });
        }
        // Fixed-fixed segments carry no unknowns.
        links.retain(|l| !pivots[l.a].is_fixed() || !pivots[l.b].is_fixed());

        // Axle designation.
        if desc.axle.is_empty() {
            return Err(GeometryError::MissingAxle);
        }
        let axle = index_of(&pivots, &desc.axle)?;
        if pivots[axle].is_fixed() {
            return Err(GeometryError::InvalidAxle(desc.axle.clone()));
        }

        // Shock designation.
        let shock = match &desc.shock {
            None => None,
            Some(s) => {
                let a = index_of(&pivots, &s.a)?;
                let b = index_of(&pivots, &s.b)?;
                if a == b {
                    return Err(GeometryError::InvalidShock(
                        "shock endpoints coincide".to_string(),
                    ));
                }
                if pivots[a].is_fixed() && pivots[b].is_fixed() {
                    return Err(GeometryError::InvalidShock(
                        "both shock endpoints are fixed".to_string(),
                    ));
                }
                let geometric = (pivots[a].initial - pivots[b].initial).norm();
                // Explicit rest lengths are in descriptor units; the
                // geometric fallback is already scaled.
                let length0 = match s.length0 {
                    Some(v) => v * desc.scale,
                    None => geometric,
                };
                if !(length0 > 0.0 && length0.is_finite()) {
                    return Err(GeometryError::InvalidShock(format!(
                        "non-positive rest length {length0}"
                    )));
                }
                Some(ShockSpec {
                    a,
                    b,
                    length0,
                    stroke: s.stroke.map(|v| v * desc.scale),
                })
            }
        };

        // Unknown ordering: moving pivots in arena order.
        let moving: Vec<usize> = (0..pivots.len())
            .filter(|&i| !pivots[i].is_fixed())
            .collect();
        let mut slot = vec![None; pivots.len()];
        for (s, &i) in moving.iter().enumerate() {
            slot[i] = Some(s);
        }

        // DOF budget: 2 per moving pivot, minus one distance
        // constraint per link, minus the single driven input.
        let dof = 2 * moving.len() as i32 - links.len() as i32 - 1;
        if dof > 0 {
            return Err(GeometryError::Underconstrained { dof });
        }
        if dof < 0 {
            return Err(GeometryError::Overconstrained { excess: -dof });
        }

        // Every moving pivot needs two independent constraints. The
        // driven input can stand in for one on the pivots it touches.
        for &i in &moving {
            let mut count = links.iter().filter(|l| l.a == i || l.b == i).count();
            let driven_touches = i == axle
                || shock.as_ref().is_some_and(|s| s.a == i || s.b == i);
            if driven_touches {
                count += 1;
            }
            if count < 2 {
                return Err(GeometryError::Underconstrained {
                    dof: 2 - count as i32,
                });
            }
        }

        let axis = Vector2::new(desc.wheel_axis[0], desc.wheel_axis[1]);
        let norm = axis.norm();
        if !(norm > 0.0 && norm.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate("wheel_axis".to_string()));
        }

        Ok(Self {
            pivots,
            links,
            moving,
            slot,
            axle,
            shock,
            wheel_axis: axis / norm,
        })
    }

    // -- Arena access --

    pub fn pivots(&self) -> &[Pivot] {
        &self.pivots
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Arena indices of the moving pivots, in unknown-vector order.
    pub fn moving(&self) -> &[usize] {
        &self.moving
    }

    pub fn moving_count(&self) -> usize {
        self.moving.len()
    }

    /// Unknown-vector slot of a moving pivot, `None` for fixed ones.
    pub fn slot_of(&self, pivot: usize) -> Option<usize> {
        self.slot[pivot]
    }

    /// Arena index of the axle pivot.
    pub const fn axle(&self) -> usize {
        self.axle
    }

    pub fn shock(&self) -> Option<&ShockSpec> {
        self.shock.as_ref()
    }

    /// Unit direction of positive wheel travel.
    pub fn wheel_axis(&self) -> Vector2<f64> {
        self.wheel_axis
    }

    /// Zero-travel position of the axle pivot.
    pub fn initial_axle(&self) -> Point2<f64> {
        self.pivots[self.axle].initial
    }

    /// Zero-travel positions of the moving pivots, in slot order.
    /// This is the seed for the first step of a sweep.
    pub fn initial_positions(&self) -> Vec<Point2<f64>> {
        self.moving.iter().map(|&i| self.pivots[i].initial).collect()
    }

    /// Shock eye-to-eye separation in the initial geometry, if a
    /// shock is declared.
    pub fn initial_shock_separation(&self) -> Option<f64> {
        self.shock
            .map(|s| (self.pivots[s.a].initial - self.pivots[s.b].initial).norm())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::parse_string;
    use approx::assert_relative_eq;

    const SINGLE_PIVOT: &str = r#"
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

    const FOUR_BAR: &str = r#"
        name = "horst"
        axle = "axle"

        [[pivots]]
        id = "main"
        kind = "fixed"
        x = 0.0
        y = 0.0

        [[pivots]]
        id = "rocker_mount"
        kind = "fixed"
        x = 30.0
        y = 240.0

        [[pivots]]
        id = "shock_mount"
        kind = "fixed"
        x = 250.0
        y = 180.0

        [[pivots]]
        id = "axle"
        kind = "moving"
        x = -425.0
        y = -10.0

        [[pivots]]
        id = "rocker_end"
        kind = "moving"
        x = -80.0
        y = 300.0

        [[links]]
        a = "main"
        b = "axle"

        [[links]]
        a = "axle"
        b = "rocker_end"

        [[links]]
        a = "rocker_end"
        b = "rocker_mount"

        [shock]
        a = "shock_mount"
        b = "rocker_end"
    "#;

    fn build(toml_str: &str) -> Result<LinkageGraph, GeometryError> {
        LinkageGraph::build(&parse_string(toml_str).unwrap())
    }

    #[test]
    fn single_pivot_builds() {
        let g = build(SINGLE_PIVOT).unwrap();
        assert_eq!(g.moving_count(), 1);
        assert_eq!(g.links().len(), 1);
        assert_relative_eq!(g.links()[0].length, 430.0, epsilon = 1e-12);
        assert!(g.shock().is_none());
        assert_eq!(g.pivots()[g.axle()].id, "axle");
    }

    #[test]
    fn four_bar_builds_with_frozen_lengths() {
        let g = build(FOUR_BAR).unwrap();
        assert_eq!(g.moving_count(), 2);
        assert_eq!(g.links().len(), 3);
        assert_relative_eq!(g.links()[0].length, (425.0f64 * 425.0 + 100.0).sqrt(), epsilon = 1e-12);

        let shock = g.shock().unwrap();
        // Default rest length is the geometric separation.
        let expected = ((250.0f64 - -80.0).powi(2) + (180.0f64 - 300.0).powi(2)).sqrt();
        assert_relative_eq!(shock.length0, expected, epsilon = 1e-12);
        assert_relative_eq!(g.initial_shock_separation().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn scale_applies_to_coordinates_and_lengths() {
        let scaled = SINGLE_PIVOT.replace("axle = \"axle\"", "axle = \"axle\"\nscale = 0.5");
        let g = build(&scaled).unwrap();
        assert_relative_eq!(g.links()[0].length, 215.0, epsilon = 1e-12);
        assert_relative_eq!(g.initial_axle().x, 215.0, epsilon = 1e-12);
    }

    #[test]
    fn unknown_pivot_in_link() {
        let err = build(&SINGLE_PIVOT.replace("b = \"axle\"", "b = \"dropout\"")).unwrap_err();
        assert!(matches!(err, GeometryError::UnknownPivot(p) if p == "dropout"));
    }

    #[test]
    fn duplicate_pivot_id() {
        let dup = SINGLE_PIVOT.replace("id = \"main\"", "id = \"axle\"");
        assert!(matches!(
            build(&dup),
            Err(GeometryError::DuplicatePivotId(_))
        ));
    }

    #[test]
    fn duplicate_link_rejected() {
        let dup = format!(
            "{SINGLE_PIVOT}\n[[links]]\na = \"axle\"\nb = \"main\"\n"
        );
        assert!(matches!(build(&dup), Err(GeometryError::DuplicateLink { .. })));
    }

    #[test]
    fn self_link_rejected() {
        let bad = SINGLE_PIVOT.replace("a = \"main\"", "a = \"axle\"");
        assert!(matches!(
            build(&bad),
            Err(GeometryError::SelfLink(p)) if p == "axle"
        ));
    }

    #[test]
    fn underconstrained_linkage() {
        // A second moving pivot with no links at all.
        let extra = format!(
            "{SINGLE_PIVOT}\n[[pivots]]\nid = \"loose\"\nkind = \"moving\"\nx = 1.0\ny = 1.0\n"
        );
        assert!(matches!(
            build(&extra),
            Err(GeometryError::Underconstrained { .. })
        ));
    }

    #[test]
    fn overconstrained_linkage() {
        // Pinning the axle from two frame points leaves -1 DOF.
        let extra = format!(
            "{SINGLE_PIVOT}\n\
             [[pivots]]\nid = \"aux\"\nkind = \"fixed\"\nx = 100.0\ny = 100.0\n\
             [[links]]\na = \"aux\"\nb = \"axle\"\n"
        );
        assert!(matches!(
            build(&extra),
            Err(GeometryError::Overconstrained { excess: 1 })
        ));
    }

    #[test]
    fn fixed_axle_rejected() {
        let bad = SINGLE_PIVOT.replace("id = \"axle\"\n        kind = \"moving\"",
                                       "id = \"axle\"\n        kind = \"fixed\"");
        assert!(matches!(build(&bad), Err(GeometryError::InvalidAxle(_))));
    }

    #[test]
    fn zero_length_link_rejected() {
        let bad = SINGLE_PIVOT.replace("x = 430.0", "x = 0.0");
        assert!(matches!(
            build(&bad),
            Err(GeometryError::ZeroLengthLink { .. })
        ));
    }

    #[test]
    fn both_shock_ends_fixed_rejected() {
        let bad = format!(
            "{FOUR_BAR}\n"
        )
        .replace(
            "a = \"shock_mount\"\n        b = \"rocker_end\"",
            "a = \"shock_mount\"\n        b = \"rocker_mount\"",
        );
        assert!(matches!(build(&bad), Err(GeometryError::InvalidShock(_))));
    }

    #[test]
    fn closed_body_expands_to_triangle() {
        // Rigid rocker as a closed 3-point body, plus enough links to
        // balance the DOF budget: 3 moving pivots (6 DOF) need 5 links.
        let toml_str = r#"
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

            [[pivots]]
            id = "brace"
            kind = "moving"
            x = 200.0
            y = 80.0

            [[pivots]]
            id = "tip"
            kind = "moving"
            x = 300.0
            y = 160.0

            [[bodies]]
            id = "swingarm"
            points = ["main", "axle", "brace"]
            closed = true

            [[links]]
            a = "brace"
            b = "tip"

            [[links]]
            a = "axle"
            b = "tip"
        "#;
        let g = build(toml_str).unwrap();
        // Triangle contributes 3 links, explicit links 2 more.
        assert_eq!(g.links().len(), 5);
        assert_eq!(g.moving_count(), 3);
    }

    #[test]
    fn fixed_body_pins_points_and_drops_segments() {
        let toml_str = r#"
            axle = "axle"

            [[pivots]]
            id = "bb"
            kind = "fixed"
            x = 0.0
            y = 0.0

            [[pivots]]
            id = "seat_tube"
            kind = "moving"
            x = 20.0
            y = 400.0

            [[pivots]]
            id = "axle"
            kind = "moving"
            x = 430.0
            y = 0.0

            [[bodies]]
            id = "frame"
            kind = "fixed"
            points = ["bb", "seat_tube"]

            [[links]]
            a = "bb"
            b = "axle"
        "#;
        let g = build(toml_str).unwrap();
        // seat_tube was declared moving but the frame body pins it;
        // the frame segment itself joins two fixed pivots and is
        // dropped from the constraint set.
        assert_eq!(g.moving_count(), 1);
        assert_eq!(g.links().len(), 1);
    }

    #[test]
    fn invalid_scale_rejected() {
        let bad = SINGLE_PIVOT.replace("axle = \"axle\"", "axle = \"axle\"\nscale = 0.0");
        assert!(matches!(build(&bad), Err(GeometryError::InvalidScale(_))));
    }

    #[test]
    fn wheel_axis_is_normalized() {
        let tilted = SINGLE_PIVOT.replace(
            "axle = \"axle\"",
            "axle = \"axle\"\nwheel_axis = [0.0, 2.0]",
        );
        let g = build(&tilted).unwrap();
        assert_relative_eq!(g.wheel_axis().norm(), 1.0, epsilon = 1e-12);
    }
}
