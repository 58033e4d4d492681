//! Error types for heightfield and contour construction

use std::fmt;

/// Errors that can occur while constructing navigation field structures
///
/// Only construction can fail. Mutators on live structures clamp or ignore
/// bad input instead, and lookups report absence through `Option`.
#[derive(Debug, Clone, PartialEq)]
pub enum NavFieldError {
    /// A required argument was malformed (wrong-length bounds, bad vertex buffer)
    InvalidArgument(String),
    /// A span interval was degenerate (`min >= max`)
    InvalidSpan {
        /// Requested span minimum
        min: i32,
        /// Requested span maximum
        max: i32,
    },
}

impl fmt::Display for NavFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavFieldError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            NavFieldError::InvalidSpan { min, max } => {
                write!(f, "invalid span: minimum {} is not below maximum {}", min, max)
            }
        }
    }
}

impl std::error::Error for NavFieldError {}

/// Result type alias for navigation field operations
pub type Result<T> = std::result::Result<T, NavFieldError>;
