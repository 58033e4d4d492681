//! Region contours and their accumulation
//!
//! A contour is the polygonal outline of one region's footprint. Tracing
//! produces a raw vertex loop; a chain of [`ContourAlgorithm`]s reduces it to
//! the simplified outline, and the results collect in a [`ContourSet`].
//!
//! Vertex buffers are flat `i32` sequences of 4-tuples, see
//! [`VERTEX_STRIDE`].

mod null_region;
mod simplify;

pub use null_region::{MatchNullRegionEdges, NullRegionMaxEdge};
pub use simplify::ContourSimplifier;

use glam::Vec3;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NavFieldError, Result};
use crate::field::GridField;

/// Number of `i32` values per contour vertex
///
/// Raw vertices are `(x, y, z, region)` where `region` is the region on the
/// far side of the edge arriving at the vertex from its predecessor.
/// Simplification buffers use `(x, y, z, source_index)` where `source_index`
/// counts source *vertices*, not flat offsets.
pub const VERTEX_STRIDE: usize = 4;

/// A pluggable contour simplification step
///
/// `source` is the raw traced loop as `(x, y, z, region)` tuples. `result`
/// is both input and output: it arrives seeded with `(x, y, z, source_index)`
/// tuples, usually from the portal vertices or from an earlier algorithm in
/// the chain, and the algorithm adds or removes vertices in place. Every
/// vertex it inserts must carry the index of the source vertex it came from.
pub trait ContourAlgorithm {
    fn apply(&self, source: &[i32], result: &mut Vec<i32>);
}

/// The raw and simplified outline of one region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Region the contour outlines
    pub region_id: u32,
    /// Traced loop as `(x, y, z, region)` tuples, region across the arriving edge
    pub raw_verts: Vec<i32>,
    /// Simplified loop as `(x, y, z, region)` tuples, region across the leaving edge
    pub verts: Vec<i32>,
}

impl Contour {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either buffer is not a whole number of
    /// vertices.
    pub fn new(region_id: u32, raw_verts: Vec<i32>, verts: Vec<i32>) -> Result<Self> {
        if raw_verts.len() % VERTEX_STRIDE != 0 || verts.len() % VERTEX_STRIDE != 0 {
            return Err(NavFieldError::InvalidArgument(format!(
                "vertex buffers must hold whole vertices of {} values (got {} and {})",
                VERTEX_STRIDE,
                raw_verts.len(),
                verts.len()
            )));
        }
        Ok(Self {
            region_id,
            raw_verts,
            verts,
        })
    }

    #[inline]
    pub fn raw_vertex_count(&self) -> usize {
        self.raw_verts.len() / VERTEX_STRIDE
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.verts.len() / VERTEX_STRIDE
    }

    /// Simplified vertex `index` as `[x, y, z, neighbour_region]`
    pub fn vertex(&self, index: usize) -> Option<[i32; 4]> {
        let start = index.checked_mul(VERTEX_STRIDE)?;
        let end = start.checked_add(VERTEX_STRIDE)?;
        let v = self.verts.get(start..end)?;
        Some([v[0], v[1], v[2], v[3]])
    }
}

/// Append-only collection of contours in one grid's coordinate system
///
/// The set owns its [`GridField`] and forwards the coordinate accessors, so
/// a mesh builder can turn contour vertices back into world space. Contours
/// are kept in insertion order and are never removed.
///
/// Appending is not synchronised. Parallel tracers should each fill their
/// own buffer and let a single thread append the results.
#[derive(Debug, Clone)]
pub struct ContourSet {
    field: GridField,
    contours: Vec<Contour>,
}

impl ContourSet {
    /// Create an empty set over explicit bounds
    ///
    /// `initial_capacity` only pre-sizes storage.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either bound does not have 3 components.
    pub fn new(
        bounds_min: &[f32],
        bounds_max: &[f32],
        cell_size: f32,
        cell_height: f32,
        initial_capacity: usize,
    ) -> Result<Self> {
        let field = GridField::new(bounds_min, bounds_max, cell_size, cell_height)?;
        Ok(Self::from_field(field, initial_capacity))
    }

    /// Create an empty set sharing the coordinate system of `field`
    pub fn from_field(field: GridField, initial_capacity: usize) -> Self {
        debug!("contour set with capacity {}", initial_capacity);
        Self {
            field,
            contours: Vec::with_capacity(initial_capacity),
        }
    }

    #[inline]
    pub fn field(&self) -> &GridField {
        &self.field
    }

    #[inline]
    pub fn bounds_min(&self) -> Vec3 {
        self.field.bounds_min()
    }

    #[inline]
    pub fn bounds_max(&self) -> Vec3 {
        self.field.bounds_max()
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.field.cell_size()
    }

    #[inline]
    pub fn cell_height(&self) -> f32 {
        self.field.cell_height()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.field.width()
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.field.depth()
    }

    pub fn add(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Contour at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.contours.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }
}

impl<'a> IntoIterator for &'a ContourSet {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}
