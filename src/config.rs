//! Field Configuration and Builder
//!
//! One configuration describes the coordinate system shared by the
//! heightfield, the region table and the contour set of a build.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec3;

use crate::contour::ContourSet;
use crate::error::{NavFieldError, Result};
use crate::field::{GridField, DEFAULT_CELL_DIMENSION};
use crate::heightfield::SolidHeightfield;

/// Default contour set capacity hint
pub const DEFAULT_CONTOUR_CAPACITY: usize = 64;

/// Grid geometry for one navigation mesh build
///
/// Only the configuration is serialized (with the `serde` feature), never the
/// structures built from it.
///
/// # Example
///
/// ```rust
/// use navfield::*;
///
/// let config = FieldConfigBuilder::new()
///     .bounds(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 4.0, 10.0))
///     .cell_size(0.5)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let heightfield = config.heightfield();
/// let contours = config.contour_set();
/// assert_eq!(heightfield.field(), contours.field());
/// assert_eq!(heightfield.field().width(), 40);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    /// Minimum corner of the world-space bounds
    pub bounds_min: Vec3,

    /// Maximum corner of the world-space bounds
    pub bounds_max: Vec3,

    /// Horizontal size of a grid cell in world units
    ///
    /// Smaller cells follow the source geometry more closely but the
    /// number of columns grows with the square of the resolution.
    pub cell_size: f32,

    /// Vertical size of one span unit in world units
    pub cell_height: f32,

    /// Expected number of contours, used to pre-size the contour set
    pub contour_capacity: usize,
}

impl FieldConfig {
    /// Grid described by this configuration
    pub fn grid_field(&self) -> GridField {
        GridField::from_vec3(self.bounds_min, self.bounds_max, self.cell_size, self.cell_height)
    }

    /// Empty heightfield over the configured grid
    pub fn heightfield(&self) -> SolidHeightfield {
        SolidHeightfield::from_field(self.grid_field())
    }

    /// Empty contour set over the configured grid
    pub fn contour_set(&self) -> ContourSet {
        ContourSet::from_field(self.grid_field(), self.contour_capacity)
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::ONE,
            cell_size: DEFAULT_CELL_DIMENSION,
            cell_height: DEFAULT_CELL_DIMENSION,
            contour_capacity: DEFAULT_CONTOUR_CAPACITY,
        }
    }
}

/// Builder for creating FieldConfig with validation
///
/// Unlike the clamping setters on a live field, the builder rejects bad
/// values outright since nothing has been built yet.
#[derive(Debug, Clone)]
pub struct FieldConfigBuilder {
    bounds_min: Vec3,
    bounds_max: Vec3,
    cell_size: f32,
    cell_height: f32,
    contour_capacity: usize,
}

impl FieldConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - bounds: unit box
    /// - cell_size: 0.1
    /// - cell_height: 0.1
    /// - contour_capacity: 64
    pub fn new() -> Self {
        let defaults = FieldConfig::default();
        Self {
            bounds_min: defaults.bounds_min,
            bounds_max: defaults.bounds_max,
            cell_size: defaults.cell_size,
            cell_height: defaults.cell_height,
            contour_capacity: defaults.contour_capacity,
        }
    }

    /// Set the world-space bounds
    ///
    /// Checked in [`build`](Self::build), once both corners are known.
    pub fn bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.bounds_min = min;
        self.bounds_max = max;
        self
    }

    /// Set the bounds from three-component slices
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either slice does not have 3 components
    pub fn bounds_from_slices(self, min: &[f32], max: &[f32]) -> Result<Self> {
        match (min, max) {
            ([x0, y0, z0], [x1, y1, z1]) => Ok(self.bounds(
                Vec3::new(*x0, *y0, *z0),
                Vec3::new(*x1, *y1, *z1),
            )),
            _ => Err(NavFieldError::InvalidArgument(format!(
                "bounds must have 3 components (got {} and {})",
                min.len(),
                max.len()
            ))),
        }
    }

    /// Set the horizontal cell size
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the size is not a positive finite number
    pub fn cell_size(mut self, size: f32) -> Result<Self> {
        self.cell_size = positive("cell size", size)?;
        Ok(self)
    }

    /// Set the vertical cell height
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the height is not a positive finite number
    pub fn cell_height(mut self, height: f32) -> Result<Self> {
        self.cell_height = positive("cell height", height)?;
        Ok(self)
    }

    /// Set the expected number of contours
    pub fn contour_capacity(mut self, capacity: usize) -> Self {
        self.contour_capacity = capacity;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the bounds are not finite or the
    /// minimum exceeds the maximum on any axis
    pub fn build(self) -> Result<FieldConfig> {
        if !self.bounds_min.is_finite() || !self.bounds_max.is_finite() {
            return Err(NavFieldError::InvalidArgument(
                "bounds must be finite".to_string(),
            ));
        }
        if self.bounds_min.cmpgt(self.bounds_max).any() {
            return Err(NavFieldError::InvalidArgument(format!(
                "bounds minimum {} exceeds maximum {}",
                self.bounds_min, self.bounds_max
            )));
        }

        Ok(FieldConfig {
            bounds_min: self.bounds_min,
            bounds_max: self.bounds_max,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            contour_capacity: self.contour_capacity,
        })
    }
}

impl Default for FieldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(NavFieldError::InvalidArgument(format!(
            "{} must be positive (got {})",
            name, value
        )))
    }
}
