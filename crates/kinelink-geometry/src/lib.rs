//! Linkage geometry descriptions and validated linkage graphs.
//!
//! A rear-suspension linkage enters the system as a declarative
//! [`LinkageDescriptor`] (usually parsed from TOML): named fixed and
//! moving pivots, rigid links between them, an axle designation, and
//! optionally a shock pair. [`LinkageGraph::build`] validates the
//! description and freezes each link's rigid length from the initial
//! coordinates, producing the immutable structure every other
//! component consumes.
//!
//! # Architecture
//!
//! ```text
//! TOML ──► LinkageDescriptor ──► LinkageGraph ──► solver / sweep
//! ```
//!
//! # Units
//!
//! All coordinates and lengths are millimeters. A descriptor traced
//! from an image may carry a `scale` factor (mm per source unit) that
//! is applied once at build time; everything downstream is mm.

pub mod descriptor;
pub mod graph;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use descriptor::{
    parse_file, parse_string, BodyDescriptor, BodyKind, LinkDescriptor, LinkageDescriptor,
    PivotDescriptor, PivotKind, ShockDescriptor,
};
pub use graph::{Link, LinkageGraph, Pivot, ShockSpec};
