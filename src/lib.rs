//! Spatial data structures for navigation mesh generation
//!
//! Holds the structural backbone a navmesh build pipeline works on: the grid
//! coordinate system, per-column solid spans, region bookkeeping, and the
//! contours traced around regions. Voxelization, region growing, contour
//! tracing and polygon mesh building are left to the caller; this crate
//! keeps their shared data consistent.
//!
//! # Quick Start
//!
//! ```rust
//! use navfield::*;
//!
//! let config = FieldConfigBuilder::new()
//!     .bounds(Vec3::ZERO, Vec3::new(8.0, 4.0, 8.0))
//!     .cell_size(1.0)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! // A voxelizer fills the heightfield column by column.
//! let mut heightfield = config.heightfield();
//! heightfield.add_span(2, 3, 0, 4, 0x1);
//!
//! // A contour tracer feeds raw loops through the simplifier.
//! let simplifier = ContourSimplifier::new().with_algorithm(MatchNullRegionEdges::new(1.0));
//! let raw = vec![0, 0, 0, 0,  0, 0, 3, 0,  3, 0, 3, 0,  3, 0, 0, 0];
//! let mut contours = config.contour_set();
//! if let Some(contour) = simplifier.simplify(1, raw).unwrap() {
//!     contours.add(contour);
//! }
//! assert_eq!(contours.len(), 1);
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, spans, regions and contours
//!
//! # Threading
//!
//! Nothing here is synchronised. Work can be split across grid columns
//! with a single writer per column; contour tracers running in parallel
//! should collect into their own buffers and append from one thread.

// Modules
pub mod error;
pub mod config;
pub mod field;
pub mod span;
pub mod heightfield;
pub mod region;
pub mod geometry;
pub mod contour;

// Re-export core types for convenience
pub use error::{NavFieldError, Result};
pub use config::{FieldConfig, FieldConfigBuilder};
pub use field::{FieldEditor, GridField};
pub use span::{HeightSpan, SpanId};
pub use heightfield::{ColumnIter, SolidHeightfield};
pub use region::{Region, NULL_REGION};
pub use contour::{
    Contour, ContourAlgorithm, ContourSet, ContourSimplifier, MatchNullRegionEdges,
    NullRegionMaxEdge, VERTEX_STRIDE,
};

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
