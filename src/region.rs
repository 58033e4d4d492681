//! Region Metadata
//!
//! Bookkeeping for one region id, shared by region growing, region merging
//! and contour tracing. The record holds data only and runs no algorithm.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Region id reserved for "no region" (background, unwalkable space)
pub const NULL_REGION: u32 = 0;

/// Metadata for a single region
///
/// Spans refer to regions by id through their flags, never by reference.
///
/// # Connections
///
/// `connections` lists the neighbouring region ids in the order they are met
/// while walking the region's boundary. One entry is recorded per distinct
/// boundary segment, so **duplicates are meaningful**: a neighbour that
/// appears twice touches this region along two separate stretches of border.
/// Merging two such regions would enclose area belonging to neither. Do not
/// deduplicate this list.
///
/// # Overlapping regions
///
/// `overlapping_regions` gets one entry for every column where a span of
/// this region lies directly beneath a span of the listed region. This
/// region's own id may appear, meaning it is stacked on itself.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Region id (`NULL_REGION` is the background)
    pub id: u32,
    /// Number of spans assigned to the region
    pub span_count: usize,
    /// Marks the region for renumbering during id compaction
    pub remap: bool,
    /// Neighbour region per boundary segment, in boundary order
    pub connections: Vec<u32>,
    /// Regions with spans directly above this region's spans
    pub overlapping_regions: Vec<u32>,
}

impl Region {
    /// Create an empty region record with the given id
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Reuse this record under a new id
    ///
    /// Clears the span count, connections and overlaps. `remap` is left as
    /// is for the compaction pass that owns it.
    pub fn reset_with_id(&mut self, new_id: u32) {
        self.id = new_id;
        self.span_count = 0;
        self.connections.clear();
        self.overlapping_regions.clear();
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.id == NULL_REGION
    }

    /// Number of separate boundary segments shared with `other`
    pub fn connection_segment_count(&self, other: u32) -> usize {
        self.connections.iter().filter(|&&id| id == other).count()
    }

    /// Whether a span of `other` sits directly on top of one of ours
    pub fn is_overlapped_by(&self, other: u32) -> bool {
        self.overlapping_regions.contains(&other)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, spans: {}, connections: {:?}, overlaps: {:?}",
            self.id, self.span_count, self.connections, self.overlapping_regions
        )
    }
}
