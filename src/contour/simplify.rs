//! Contour simplification pipeline
//!
//! Turns a raw traced loop into a [`Contour`] by seeding the mandatory
//! vertices and running a chain of [`ContourAlgorithm`]s over them.

use log::warn;

use super::{Contour, ContourAlgorithm, VERTEX_STRIDE};
use crate::error::{NavFieldError, Result};
use crate::geometry::point_segment_distance_sq;

/// Ordered chain of simplification steps
///
/// # Example
///
/// ```
/// use navfield::*;
///
/// let simplifier = ContourSimplifier::new()
///     .with_algorithm(MatchNullRegionEdges::new(1.5))
///     .with_algorithm(NullRegionMaxEdge::new(12));
///
/// // A 4x4 island surrounded by the null region.
/// let raw = vec![
///     0, 0, 0, 0,  0, 0, 4, 0,  4, 0, 4, 0,  4, 0, 0, 0,
/// ];
/// let contour = simplifier.simplify(1, raw).unwrap().unwrap();
/// assert_eq!(contour.vertex_count(), 4);
/// ```
#[derive(Default)]
pub struct ContourSimplifier {
    algorithms: Vec<Box<dyn ContourAlgorithm>>,
}

impl ContourSimplifier {
    /// Create a simplifier with no algorithms
    ///
    /// Without algorithms only the seed vertices survive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an algorithm to the end of the chain
    pub fn with_algorithm<A>(mut self, algorithm: A) -> Self
    where
        A: ContourAlgorithm + 'static,
    {
        self.algorithms.push(Box::new(algorithm));
        self
    }

    #[inline]
    pub fn algorithm_count(&self) -> usize {
        self.algorithms.len()
    }

    /// Simplify one raw loop
    ///
    /// `raw_verts` holds `(x, y, z, region)` tuples where `region` is the
    /// region across the edge arriving at the vertex. In the returned
    /// contour each simplified vertex instead carries the region across the
    /// edge leaving it.
    ///
    /// Returns `Ok(None)` when no valid polygon (3 or more vertices) can be
    /// formed. The contour is dropped and a warning logged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `raw_verts` is not a whole number of
    /// vertices.
    pub fn simplify(&self, region_id: u32, raw_verts: Vec<i32>) -> Result<Option<Contour>> {
        if raw_verts.len() % VERTEX_STRIDE != 0 {
            return Err(NavFieldError::InvalidArgument(format!(
                "raw contour length {} is not a multiple of {}",
                raw_verts.len(),
                VERTEX_STRIDE
            )));
        }
        if raw_verts.is_empty() {
            warn!("discarded empty contour for region {}", region_id);
            return Ok(None);
        }

        let mut verts = seed_vertices(&raw_verts);
        for algorithm in &self.algorithms {
            algorithm.apply(&raw_verts, &mut verts);
        }
        if verts.len() / VERTEX_STRIDE < 3 {
            restore_third_vertex(&raw_verts, &mut verts);
        }

        // Swap source indices for the region across each simplified edge,
        // taken from the source vertex that follows.
        let source_count = raw_verts.len() / VERTEX_STRIDE;
        for v in verts.chunks_exact_mut(VERTEX_STRIDE) {
            let next = (v[3] as usize + 1) % source_count;
            v[3] = raw_verts[next * VERTEX_STRIDE + 3];
        }

        remove_vertical_segments(region_id, &mut verts);

        if verts.len() / VERTEX_STRIDE < 3 {
            warn!(
                "discarded contour for region {}: cannot form enough valid edges",
                region_id
            );
            return Ok(None);
        }
        Contour::new(region_id, raw_verts, verts).map(Some)
    }
}

/// Mandatory vertices every simplified contour starts from
///
/// A vertex where the neighbouring region changes is a portal end and must
/// be kept. A loop with no such change (an island, or a region wrapped
/// by a single neighbour) is seeded with its lower-left and upper-right
/// vertices instead.
fn seed_vertices(source: &[i32]) -> Vec<i32> {
    let count = source.len() / VERTEX_STRIDE;
    let mut seeds = Vec::new();
    for i in 0..count {
        let region = source[i * VERTEX_STRIDE + 3];
        let next_region = source[((i + 1) % count) * VERTEX_STRIDE + 3];
        if region != next_region {
            push_source_vertex(source, &mut seeds, i);
        }
    }
    if !seeds.is_empty() {
        return seeds;
    }

    let mut lower_left = 0;
    let mut upper_right = 0;
    for (i, v) in source.chunks_exact(VERTEX_STRIDE).enumerate() {
        let ll = &source[lower_left * VERTEX_STRIDE..];
        if v[0] < ll[0] || (v[0] == ll[0] && v[2] < ll[2]) {
            lower_left = i;
        }
        let ur = &source[upper_right * VERTEX_STRIDE..];
        if v[0] > ur[0] || (v[0] == ur[0] && v[2] > ur[2]) {
            upper_right = i;
        }
    }
    push_source_vertex(source, &mut seeds, lower_left);
    if upper_right != lower_left {
        push_source_vertex(source, &mut seeds, upper_right);
    }
    seeds
}

fn push_source_vertex(source: &[i32], verts: &mut Vec<i32>, index: usize) {
    let s = index * VERTEX_STRIDE;
    verts.extend([source[s], source[s + 1], source[s + 2], index as i32]);
}

/// Add back the source vertex farthest from the first edge
///
/// Vertices stay ordered by source index so the loop keeps its winding.
fn restore_third_vertex(source: &[i32], verts: &mut Vec<i32>) {
    if verts.len() < 2 * VERTEX_STRIDE {
        return;
    }
    let (ax, az) = (verts[0], verts[2]);
    let (bx, bz) = (verts[VERTEX_STRIDE], verts[VERTEX_STRIDE + 2]);

    let mut max_distance = 0.0;
    let mut selected = None;
    for (i, v) in source.chunks_exact(VERTEX_STRIDE).enumerate() {
        let distance = point_segment_distance_sq(v[0], v[2], ax, az, bx, bz);
        if distance > max_distance {
            max_distance = distance;
            selected = Some(i);
        }
    }

    if let Some(index) = selected {
        push_source_vertex(source, verts, index);
        let mut tuples: Vec<[i32; 4]> = verts
            .chunks_exact(VERTEX_STRIDE)
            .map(|v| [v[0], v[1], v[2], v[3]])
            .collect();
        tuples.sort_by_key(|v| v[3]);
        verts.clear();
        verts.extend(tuples.into_iter().flatten());
    }
}

/// Drop vertices that share x and z with their predecessor
///
/// A vertical segment breaks triangulation later on, so keeping the mesh
/// buildable wins over keeping portal detail.
fn remove_vertical_segments(region_id: u32, verts: &mut Vec<i32>) {
    let mut removed = 0;
    let mut i = 0;
    while verts.len() / VERTEX_STRIDE > 1 && i < verts.len() / VERTEX_STRIDE {
        let next = (i + 1) % (verts.len() / VERTEX_STRIDE);
        let (p, n) = (i * VERTEX_STRIDE, next * VERTEX_STRIDE);
        if verts[p] == verts[n] && verts[p + 2] == verts[n + 2] {
            verts.drain(n..n + VERTEX_STRIDE);
            removed += 1;
        } else {
            i += 1;
        }
    }
    if removed > 0 {
        warn!(
            "contour detail lost: removed {} vertical segment(s) from region {}",
            removed, region_id
        );
    }
}
