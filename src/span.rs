//! Height Span Structure
//!
//! A span is one contiguous solid interval within a grid column.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NavFieldError, Result};

/// Index of a span inside its heightfield's span arena
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(pub(crate) usize);

impl SpanId {
    /// Position of the span in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A vertical solid interval in one grid column
///
/// `min` and `max` are height indices in cell-height units. `min < max`
/// holds for every span that exists: construction rejects degenerate
/// intervals and the resize setters collapse bad requests to a one unit
/// interval.
///
/// `next` links to the span above in the same column. Spans are stored in
/// an arena owned by the heightfield, so the link is an index rather than a
/// pointer. Keeping the chain sorted and non-overlapping is the job of
/// whoever inserts the spans.
///
/// `flags` is opaque storage. Walkable, area and region bits are defined by
/// the passes that read and write them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightSpan {
    min: i32,
    max: i32,
    flags: u32,
    next: Option<SpanId>,
}

impl HeightSpan {
    /// Create a span covering `min..max`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpan` if `min >= max`. Zero-thickness spans are
    /// rejected along with inverted ones.
    pub fn new(min: i32, max: i32, flags: u32) -> Result<Self> {
        if min >= max {
            return Err(NavFieldError::InvalidSpan { min, max });
        }
        Ok(Self {
            min,
            max,
            flags,
            next: None,
        })
    }

    /// Build a span whose interval the caller has already validated
    pub(crate) fn from_checked(min: i32, max: i32, flags: u32) -> Self {
        debug_assert!(min < max, "degenerate span {}..{}", min, max);
        Self {
            min,
            max,
            flags,
            next: None,
        }
    }

    #[inline]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// The next span up the column, if any
    #[inline]
    pub fn next(&self) -> Option<SpanId> {
        self.next
    }

    /// Thickness of the span in cell-height units (always at least 1)
    ///
    /// Unsigned, so a span running from `i32::MIN` to `i32::MAX` still fits.
    #[inline]
    pub fn height(&self) -> u32 {
        self.max.abs_diff(self.min)
    }

    #[inline]
    pub fn set_flags(&mut self, value: u32) {
        self.flags = value;
    }

    /// Set the maximum. Values at or below `min` become `min + 1`.
    pub fn set_max(&mut self, value: i32) {
        self.max = if value <= self.min { self.min + 1 } else { value };
    }

    /// Set the minimum. Values at or above `max` become `max - 1`.
    pub fn set_min(&mut self, value: i32) {
        self.min = if value >= self.max { self.max - 1 } else { value };
    }

    pub(crate) fn set_next(&mut self, value: Option<SpanId>) {
        self.next = value;
    }
}

impl fmt::Display for HeightSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}, flags: {:#x}", self.min, self.max, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_round_trip() {
        for &(min, max, flags) in &[(0, 1, 0), (-20, 35, 0xdead_beef), (7, 8, u32::MAX)] {
            let span = HeightSpan::new(min, max, flags).unwrap();
            assert_eq!(span.min(), min);
            assert_eq!(span.max(), max);
            assert_eq!(span.flags(), flags);
            assert_eq!(span.next(), None);
        }
    }

    #[test]
    fn test_span_rejects_degenerate() {
        assert_eq!(
            HeightSpan::new(5, 4, 0),
            Err(NavFieldError::InvalidSpan { min: 5, max: 4 })
        );
        assert!(HeightSpan::new(3, 3, 0).is_err());
    }

    #[test]
    fn test_set_max() {
        let mut span = HeightSpan::new(10, 20, 0).unwrap();
        span.set_max(15);
        assert_eq!(span.max(), 15);
        span.set_max(10);
        assert_eq!(span.max(), 11);
        span.set_max(-4);
        assert_eq!(span.max(), 11);
        span.set_max(11);
        assert_eq!(span.max(), 11);
        span.set_max(12);
        assert_eq!(span.max(), 12);
    }

    #[test]
    fn test_set_min() {
        let mut span = HeightSpan::new(10, 20, 0).unwrap();
        span.set_min(-3);
        assert_eq!(span.min(), -3);
        span.set_min(20);
        assert_eq!(span.min(), 19);
        span.set_min(100);
        assert_eq!(span.min(), 19);
        span.set_min(18);
        assert_eq!(span.min(), 18);
        assert!(span.min() < span.max());
    }

    #[test]
    fn test_flags_are_opaque() {
        let mut span = HeightSpan::new(0, 2, 0).unwrap();
        span.set_flags(0x8000_0001);
        assert_eq!(span.flags(), 0x8000_0001);
        assert_eq!(span.height(), 2);
    }

    #[test]
    fn test_height_at_limits() {
        let span = HeightSpan::new(i32::MIN, i32::MAX, 0).unwrap();
        assert_eq!(span.height(), u32::MAX);
    }

    #[test]
    fn test_display() {
        let span = HeightSpan::new(2, 9, 0x11).unwrap();
        assert_eq!(span.to_string(), "2->9, flags: 0x11");
    }
}
