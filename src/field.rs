//! Grid Field Coordinate System
//!
//! Maps an axis-aligned world-space box onto an integer grid of cells. The
//! heightfield, the region table and the contour set all share one
//! `GridField` so their coordinates can never drift apart.

use glam::Vec3;
use log::debug;

use crate::error::{NavFieldError, Result};

/// Smallest cell size or height a field will ever hold
///
/// Cell dimensions are divisors in the width/depth calculation, so zero,
/// negative and NaN values are clamped up to this.
pub const MIN_CELL_DIMENSION: f32 = f32::MIN_POSITIVE;

/// Default cell size and height for fields created without cell info
pub const DEFAULT_CELL_DIMENSION: f32 = 0.1;

/// Width offsets for the four axis-aligned directions, clockwise from (-1, 0)
const DIR_OFFSET_WIDTH: [i32; 4] = [-1, 0, 1, 0];
/// Depth offsets for the four axis-aligned directions, clockwise from (-1, 0)
const DIR_OFFSET_DEPTH: [i32; 4] = [0, 1, 0, -1];

/// Axis-aligned grid over a world-space box
///
/// The grid's columns run along the y-axis. `width` counts cells along x and
/// `depth` counts cells along z:
///
/// - `width = round((max.x - min.x) / cell_size)`
/// - `depth = round((max.z - min.z) / cell_size)`
///
/// Both are recomputed whenever the bounds or the cell size change.
///
/// The public surface is read-only. Mutation goes through [`FieldEditor`],
/// which only the subsystem that owns the field can obtain.
///
/// # Example
///
/// ```
/// use navfield::*;
///
/// let field = GridField::from_vec3(Vec3::ZERO, Vec3::new(10.0, 5.0, 10.0), 1.0, 0.5);
/// assert_eq!(field.width(), 10);
/// assert_eq!(field.depth(), 10);
/// assert_eq!(field.grid_index(3, 4), Some(34));
/// assert_eq!(field.grid_index(10, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    bounds_min: Vec3,
    bounds_max: Vec3,
    cell_size: f32,
    cell_height: f32,
    width: i32,
    depth: i32,
}

impl GridField {
    /// Create a field from three-component bound slices
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either bound does not hold exactly three
    /// components. Cell size and height are clamped, never rejected.
    pub fn new(
        bounds_min: &[f32],
        bounds_max: &[f32],
        cell_size: f32,
        cell_height: f32,
    ) -> Result<Self> {
        match (to_vec3(bounds_min), to_vec3(bounds_max)) {
            (Some(min), Some(max)) => Ok(Self::from_vec3(min, max, cell_size, cell_height)),
            _ => Err(NavFieldError::InvalidArgument(format!(
                "bounds must have 3 components (got {} and {})",
                bounds_min.len(),
                bounds_max.len()
            ))),
        }
    }

    /// Create a field from typed bounds
    pub fn from_vec3(bounds_min: Vec3, bounds_max: Vec3, cell_size: f32, cell_height: f32) -> Self {
        let mut field = Self {
            bounds_min,
            bounds_max,
            cell_size: clamp_cell_dimension(cell_size),
            cell_height: clamp_cell_dimension(cell_height),
            width: 0,
            depth: 0,
        };
        field.calculate_width_depth();
        debug!(
            "grid field {}x{} cells (cell size {}, cell height {})",
            field.width, field.depth, field.cell_size, field.cell_height
        );
        field
    }

    /// Create a field over the unit box with the given cell info
    pub fn with_cell_info(cell_size: f32, cell_height: f32) -> Self {
        Self::from_vec3(Vec3::ZERO, Vec3::ONE, cell_size, cell_height)
    }

    /// Minimum bounds of the field (copied)
    #[inline]
    pub fn bounds_min(&self) -> Vec3 {
        self.bounds_min
    }

    /// Maximum bounds of the field (copied)
    #[inline]
    pub fn bounds_max(&self) -> Vec3 {
        self.bounds_max
    }

    /// Horizontal size of a cell in world units
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Height of one span unit in world units
    #[inline]
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Number of cells along the x-axis
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of cells along the z-axis
    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Total number of grid cells (`width * depth`, saturating)
    #[inline]
    pub fn cell_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.depth as usize)
    }

    /// Check whether a cell coordinate lies inside the grid
    #[inline]
    pub fn is_in_bounds(&self, width_index: i32, depth_index: i32) -> bool {
        width_index >= 0
            && depth_index >= 0
            && width_index < self.width
            && depth_index < self.depth
    }

    /// Flattened storage index of a cell
    ///
    /// Returns `width_index * depth + depth_index`, or `None` for any
    /// coordinate outside the grid. Neighbour probes one cell past an edge
    /// are expected and simply yield `None`.
    #[inline]
    pub fn grid_index(&self, width_index: i32, depth_index: i32) -> Option<usize> {
        if !self.is_in_bounds(width_index, depth_index) {
            return None;
        }
        Some(width_index as usize * self.depth as usize + depth_index as usize)
    }

    /// World-space position of a cell's minimum corner (at the field floor)
    pub fn world_position(&self, width_index: i32, depth_index: i32) -> Vec3 {
        self.bounds_min
            + Vec3::new(
                width_index as f32 * self.cell_size,
                0.0,
                depth_index as f32 * self.cell_size,
            )
    }

    /// Check whether a world-space box overlaps the field bounds
    ///
    /// Edge contact counts as overlap. Only a strict gap on at least one
    /// axis makes the boxes disjoint.
    pub fn overlaps(&self, bounds_min: Vec3, bounds_max: Vec3) -> bool {
        let disjoint = self.bounds_min.cmpgt(bounds_max) | self.bounds_max.cmplt(bounds_min);
        !disjoint.any()
    }

    /// Width offset of a direction code
    ///
    /// Only the low two bits of `dir` are used, so the offsets repeat with
    /// period 4. Pair with [`GridField::dir_offset_depth`] using the same `dir`.
    #[inline]
    pub fn dir_offset_width(dir: i32) -> i32 {
        DIR_OFFSET_WIDTH[(dir & 0x3) as usize]
    }

    /// Depth offset of a direction code
    #[inline]
    pub fn dir_offset_depth(dir: i32) -> i32 {
        DIR_OFFSET_DEPTH[(dir & 0x3) as usize]
    }

    /// Mutation capability for the subsystem that owns this field
    pub(crate) fn editor(&mut self) -> FieldEditor<'_> {
        FieldEditor { field: self }
    }

    fn calculate_width_depth(&mut self) {
        self.width = cells_along(self.bounds_max.x - self.bounds_min.x, self.cell_size);
        self.depth = cells_along(self.bounds_max.z - self.bounds_min.z, self.cell_size);
    }
}

impl Default for GridField {
    /// Unit box with 0.1 cell size and height
    fn default() -> Self {
        Self::with_cell_info(DEFAULT_CELL_DIMENSION, DEFAULT_CELL_DIMENSION)
    }
}

/// Write access to a [`GridField`]
///
/// Handed out only by the structure that builds the field (see
/// `SolidHeightfield::edit_field`). Malformed input is ignored and leaves
/// the previous valid state in place: a field that is live in a pipeline
/// must never become invalid part way through a run.
pub struct FieldEditor<'a> {
    field: &'a mut GridField,
}

impl FieldEditor<'_> {
    /// Replace both bounds. Ignored unless both slices have 3 components.
    pub fn set_bounds(&mut self, min: &[f32], max: &[f32]) {
        if let (Some(min), Some(max)) = (to_vec3(min), to_vec3(max)) {
            self.set_bounds_vec3(min, max);
        }
    }

    /// Replace both bounds from individual components
    pub fn set_bounds_xyz(&mut self, xmin: f32, ymin: f32, zmin: f32, xmax: f32, ymax: f32, zmax: f32) {
        self.set_bounds_vec3(Vec3::new(xmin, ymin, zmin), Vec3::new(xmax, ymax, zmax));
    }

    /// Replace both bounds. Inverted bounds give an empty grid.
    pub fn set_bounds_vec3(&mut self, min: Vec3, max: Vec3) {
        self.field.bounds_min = min;
        self.field.bounds_max = max;
        self.field.calculate_width_depth();
    }

    /// Replace the minimum bounds. Ignored unless the slice has 3 components.
    pub fn set_bounds_min(&mut self, value: &[f32]) {
        if let Some(min) = to_vec3(value) {
            self.field.bounds_min = min;
            self.field.calculate_width_depth();
        }
    }

    /// Replace the maximum bounds. Ignored unless the slice has 3 components.
    pub fn set_bounds_max(&mut self, value: &[f32]) {
        if let Some(max) = to_vec3(value) {
            self.field.bounds_max = max;
            self.field.calculate_width_depth();
        }
    }

    /// Set the horizontal cell size, clamped to [`MIN_CELL_DIMENSION`]
    ///
    /// Width and depth are recomputed and saturate at `i32::MAX`.
    pub fn set_cell_size(&mut self, value: f32) {
        self.field.cell_size = clamp_cell_dimension(value);
        self.field.calculate_width_depth();
    }

    /// Set the span unit height, clamped to [`MIN_CELL_DIMENSION`]
    pub fn set_cell_height(&mut self, value: f32) {
        self.field.cell_height = clamp_cell_dimension(value);
    }

    /// Reset the bounds to the unit box
    pub fn reset_bounds(&mut self) {
        self.set_bounds_vec3(Vec3::ZERO, Vec3::ONE);
    }

    /// Reset cell size and height to their defaults
    pub fn reset_cell_info(&mut self) {
        self.field.cell_size = DEFAULT_CELL_DIMENSION;
        self.field.cell_height = DEFAULT_CELL_DIMENSION;
        self.field.calculate_width_depth();
    }
}

fn to_vec3(value: &[f32]) -> Option<Vec3> {
    match value {
        [x, y, z] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

/// `f32::max` ignores a `NaN` operand, so `NaN` also lands on the minimum
fn clamp_cell_dimension(value: f32) -> f32 {
    value.max(MIN_CELL_DIMENSION)
}

fn cells_along(extent: f32, cell_size: f32) -> i32 {
    // Float-to-int `as` saturates, so huge extents cannot wrap.
    ((extent / cell_size + 0.5) as i32).max(0)
}
