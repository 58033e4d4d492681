//! Simplification steps that restore detail along null region borders

use super::{ContourAlgorithm, VERTEX_STRIDE};
use crate::geometry::point_segment_distance_sq;
use crate::region::NULL_REGION;

const NULL: i32 = NULL_REGION as i32;

/// Insert the source vertex for `source_index` after result vertex `after`
fn insert_source_vertex(source: &[i32], result: &mut Vec<i32>, after: usize, source_index: usize) {
    let s = source_index * VERTEX_STRIDE;
    let at = (after + 1) * VERTEX_STRIDE;
    result.splice(
        at..at,
        [source[s], source[s + 1], source[s + 2], source_index as i32],
    );
}

/// Source vertex index carried in the fourth field of result vertex `i`
fn source_index_of(result: &[i32], i: usize) -> usize {
    result[i * VERTEX_STRIDE + 3] as usize
}

/// Re-adds detail to edges that border the null region
///
/// Portal edges between two real regions are left straight so both sides
/// stay identical. Along null region borders, the source vertex farthest
/// from the simplified edge is inserted while its xz-distance exceeds
/// `threshold`, repeating until every such edge fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchNullRegionEdges {
    threshold: f32,
}

impl MatchNullRegionEdges {
    /// Negative thresholds are treated as zero
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
        }
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl ContourAlgorithm for MatchNullRegionEdges {
    fn apply(&self, source: &[i32], result: &mut Vec<i32>) {
        let source_count = source.len() / VERTEX_STRIDE;
        if source_count == 0 {
            return;
        }
        let threshold_sq = self.threshold * self.threshold;

        let mut a = 0;
        while a < result.len() / VERTEX_STRIDE {
            let b = (a + 1) % (result.len() / VERTEX_STRIDE);
            let (ax, az) = (result[a * VERTEX_STRIDE], result[a * VERTEX_STRIDE + 2]);
            let (bx, bz) = (result[b * VERTEX_STRIDE], result[b * VERTEX_STRIDE + 2]);
            let b_source = source_index_of(result, b);

            let mut test = (source_index_of(result, a) + 1) % source_count;
            let mut max_deviation = 0.0;
            let mut farthest = None;
            if source[test * VERTEX_STRIDE + 3] == NULL {
                while test != b_source {
                    let deviation = point_segment_distance_sq(
                        source[test * VERTEX_STRIDE],
                        source[test * VERTEX_STRIDE + 2],
                        ax,
                        az,
                        bx,
                        bz,
                    );
                    if deviation > max_deviation {
                        max_deviation = deviation;
                        farthest = Some(test);
                    }
                    test = (test + 1) % source_count;
                }
            }

            match farthest {
                Some(index) if max_deviation > threshold_sq => {
                    // Stay on `a` so the edge to the new vertex is tested next.
                    insert_source_vertex(source, result, a, index);
                }
                _ => a += 1,
            }
        }
    }
}

/// Splits long edges that border the null region
///
/// Any null region edge longer than `max_edge_length` is split at the source
/// vertex halfway (by vertex count, not distance) between its end points.
/// A length of zero disables the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullRegionMaxEdge {
    max_edge_length: i32,
}

impl NullRegionMaxEdge {
    /// Negative lengths are treated as zero
    pub fn new(max_edge_length: i32) -> Self {
        Self {
            max_edge_length: max_edge_length.max(0),
        }
    }

    #[inline]
    pub fn max_edge_length(&self) -> i32 {
        self.max_edge_length
    }
}

impl ContourAlgorithm for NullRegionMaxEdge {
    fn apply(&self, source: &[i32], result: &mut Vec<i32>) {
        let source_count = source.len() / VERTEX_STRIDE;
        if self.max_edge_length <= 0 || source_count == 0 {
            return;
        }
        let max_length_sq = i64::from(self.max_edge_length) * i64::from(self.max_edge_length);

        let mut a = 0;
        while a < result.len() / VERTEX_STRIDE {
            let b = (a + 1) % (result.len() / VERTEX_STRIDE);
            let a_source = source_index_of(result, a);
            let b_source = source_index_of(result, b);

            let mut split = None;
            let test = (a_source + 1) % source_count;
            if source[test * VERTEX_STRIDE + 3] == NULL {
                let dx = i64::from(result[b * VERTEX_STRIDE] - result[a * VERTEX_STRIDE]);
                let dz = i64::from(result[b * VERTEX_STRIDE + 2] - result[a * VERTEX_STRIDE + 2]);
                if dx * dx + dz * dz > max_length_sq {
                    let steps = if b_source < a_source {
                        b_source + source_count - a_source
                    } else {
                        b_source - a_source
                    };
                    // With no source vertex strictly between the ends there is
                    // nothing to split on.
                    if steps > 1 {
                        split = Some((a_source + steps / 2) % source_count);
                    }
                }
            }

            match split {
                Some(index) => insert_source_vertex(source, result, a, index),
                None => a += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight run along x from 0 to `len` bordering the null region, then
    /// back along z = 2 bordering region 7.
    fn strip(len: i32) -> Vec<i32> {
        let mut verts = Vec::new();
        for x in 0..len {
            verts.extend([x, 0, 0, NULL]);
        }
        for x in (1..=len).rev() {
            verts.extend([x, 0, 2, 7]);
        }
        verts
    }

    fn seed(source: &[i32], indices: &[usize]) -> Vec<i32> {
        let mut result = Vec::new();
        for &i in indices {
            let s = i * VERTEX_STRIDE;
            result.extend([source[s], source[s + 1], source[s + 2], i as i32]);
        }
        result
    }

    fn source_indices(result: &[i32]) -> Vec<i32> {
        result.chunks_exact(VERTEX_STRIDE).map(|v| v[3]).collect()
    }

    #[test]
    fn test_match_null_edges_inserts_farthest() {
        // A null border with a bump at source index 3.
        let source = vec![
            0, 0, 0, NULL, //
            2, 0, 0, NULL, //
            4, 0, 0, NULL, //
            6, 0, 5, NULL, //
            8, 0, 0, NULL, //
            10, 0, 0, 4, //
            5, 0, -6, 4, //
        ];
        let mut result = seed(&source, &[0, 5]);
        MatchNullRegionEdges::new(1.0).apply(&source, &mut result);
        assert_eq!(source_indices(&result), vec![0, 3, 5]);
        assert_eq!(&result[4..8], &[6, 0, 5, 3]);
    }

    #[test]
    fn test_match_null_edges_respects_threshold() {
        let source = vec![
            0, 0, 0, NULL, //
            5, 0, 1, NULL, //
            10, 0, 0, 2, //
            5, 0, -4, 2, //
        ];
        let mut result = seed(&source, &[0, 2]);
        MatchNullRegionEdges::new(2.0).apply(&source, &mut result);
        assert_eq!(source_indices(&result), vec![0, 2]);

        MatchNullRegionEdges::new(0.5).apply(&source, &mut result);
        assert_eq!(source_indices(&result), vec![0, 1, 2]);
    }

    #[test]
    fn test_match_null_edges_skips_portals() {
        let source = strip(6);
        // Edge 6 -> 0 runs along the region 7 portal, leave it alone.
        let mut result = seed(&source, &[0, 5, 6]);
        let before = result.clone();
        MatchNullRegionEdges::new(0.0).apply(&source, &mut result);
        assert_eq!(result, before);
    }

    #[test]
    fn test_negative_parameters_clamped() {
        assert_eq!(MatchNullRegionEdges::new(-3.0).threshold(), 0.0);
        assert_eq!(NullRegionMaxEdge::new(-3).max_edge_length(), 0);
    }

    #[test]
    fn test_max_edge_splits_long_null_edges() {
        let source = strip(12);
        // Null edge from source 0 (x=0) to source 11 (x=11), then portal back.
        let mut result = seed(&source, &[0, 11, 12]);
        NullRegionMaxEdge::new(4).apply(&source, &mut result);

        let xs: Vec<i32> = result.chunks_exact(VERTEX_STRIDE).map(|v| v[0]).collect();
        assert_eq!(xs, vec![0, 2, 5, 8, 11, 12]);
        for pair in xs.windows(2).take(4) {
            assert!(pair[1] - pair[0] <= 4);
        }
    }

    #[test]
    fn test_max_edge_disabled() {
        let source = strip(12);
        let mut result = seed(&source, &[0, 11, 12]);
        let before = result.clone();
        NullRegionMaxEdge::new(0).apply(&source, &mut result);
        assert_eq!(result, before);
    }

    #[test]
    fn test_max_edge_needs_vertex_between() {
        let source = vec![
            0, 0, 0, NULL, //
            9, 0, 9, NULL, //
        ];
        let mut result = seed(&source, &[0, 1]);
        NullRegionMaxEdge::new(1).apply(&source, &mut result);
        assert_eq!(source_indices(&result), vec![0, 1]);
    }
}
