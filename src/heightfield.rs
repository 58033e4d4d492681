//! Solid Heightfield
//!
//! Per-column chains of solid spans over a [`GridField`]. Spans live in one
//! arena and each occupied grid cell stores the index of its lowest span, so
//! a column is walked by following `next` indices upward.

use std::collections::HashMap;

use log::{debug, trace};

use crate::field::{FieldEditor, GridField};
use crate::span::{HeightSpan, SpanId};

/// Solid volume of a scene as sorted span columns
///
/// Each column is kept ascending and non-overlapping by [`add_span`]:
/// intervals separated by at least one empty unit stay separate, touching or
/// overlapping intervals are merged into one span.
///
/// Only occupied columns take up memory, so a grid clamped to a tiny cell
/// size costs nothing until spans are added.
///
/// [`add_span`]: SolidHeightfield::add_span
///
/// # Example
///
/// ```
/// use navfield::*;
///
/// let field = GridField::from_vec3(Vec3::ZERO, Vec3::new(4.0, 4.0, 4.0), 1.0, 0.5);
/// let mut heightfield = SolidHeightfield::from_field(field);
///
/// assert!(heightfield.add_span(1, 2, 0, 3, 0x1));
/// assert!(heightfield.add_span(1, 2, 6, 8, 0x2));
/// assert!(heightfield.add_span(1, 2, 3, 5, 0x4)); // Bridges the gap
///
/// let column: Vec<_> = heightfield.column(1, 2).map(|(_, s)| (s.min(), s.max())).collect();
/// assert_eq!(column, vec![(0, 8)]);
/// ```
#[derive(Debug, Clone)]
pub struct SolidHeightfield {
    field: GridField,
    /// Lowest span of each occupied cell, keyed by `GridField::grid_index`
    columns: HashMap<usize, SpanId>,
    spans: Vec<HeightSpan>,
    /// Parallel to `spans`: false once a merge has released the slot
    live: Vec<bool>,
    /// Arena slots released by merges, reused before the arena grows
    free: Vec<SpanId>,
}

impl SolidHeightfield {
    /// Create an empty heightfield over the unit box
    ///
    /// Cell size and height are clamped the same way [`GridField`] clamps
    /// them, so this never fails.
    pub fn new(cell_size: f32, cell_height: f32) -> Self {
        Self::from_field(GridField::with_cell_info(cell_size, cell_height))
    }

    /// Create an empty heightfield over an existing grid
    pub fn from_field(field: GridField) -> Self {
        debug!(
            "solid heightfield over {}x{} columns",
            field.width(),
            field.depth()
        );
        Self {
            field,
            columns: HashMap::new(),
            spans: Vec::new(),
            live: Vec::new(),
            free: Vec::new(),
        }
    }

    /// The grid this heightfield is laid out on
    #[inline]
    pub fn field(&self) -> &GridField {
        &self.field
    }

    /// Change the grid geometry
    ///
    /// The heightfield is the owner of its grid, so it is the one place where
    /// a [`FieldEditor`] is handed out. If the edit changes the number of
    /// columns or their layout, every span is discarded.
    pub fn edit_field<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut FieldEditor<'_>),
    {
        let (width, depth) = (self.field.width(), self.field.depth());
        edit(&mut self.field.editor());
        if (width, depth) != (self.field.width(), self.field.depth()) {
            debug!(
                "grid resized from {}x{} to {}x{}, clearing spans",
                width,
                depth,
                self.field.width(),
                self.field.depth()
            );
            self.clear();
        }
    }

    /// Remove every span, keeping the grid
    pub fn clear(&mut self) {
        self.columns.clear();
        self.spans.clear();
        self.live.clear();
        self.free.clear();
    }

    /// Add solid data to a column
    ///
    /// Returns `false` without changing anything if the cell lies outside
    /// the grid, either height is negative, or `min > max`. A zero-thickness
    /// request is widened to one unit, downward when it sits at `i32::MAX`.
    ///
    /// When the new interval touches or overlaps existing spans they are
    /// merged. The merged span takes the flags of whichever contributor
    /// reaches highest; when the new interval and an existing span end at
    /// the same height their flags are combined.
    pub fn add_span(
        &mut self,
        width_index: i32,
        depth_index: i32,
        min: i32,
        max: i32,
        flags: u32,
    ) -> bool {
        let Some(cell) = self.field.grid_index(width_index, depth_index) else {
            return false;
        };
        if min < 0 || max < 0 || min > max {
            return false;
        }
        let (min, max) = if min == max {
            trace!(
                "widened zero-thickness span at ({}, {}) height {}",
                width_index,
                depth_index,
                min
            );
            match max.checked_add(1) {
                Some(max) => (min, max),
                None => (min - 1, max),
            }
        } else {
            (min, max)
        };

        let Some(&first) = self.columns.get(&cell) else {
            let id = self.allocate(min, max, flags);
            self.columns.insert(cell, id);
            return true;
        };

        // Gap tests run in i64 so heights at the i32 limits cannot wrap.
        let (low, high) = (i64::from(min), i64::from(max));
        let mut current = first;
        let mut previous: Option<SpanId> = None;
        loop {
            let span = &self.spans[current.0];
            if i64::from(span.min()) > high + 1 {
                // Entirely below the current span with a gap: insert here.
                let id = self.allocate(min, max, flags);
                self.spans[id.0].set_next(Some(current));
                match previous {
                    Some(prev) => self.spans[prev.0].set_next(Some(id)),
                    None => {
                        self.columns.insert(cell, id);
                    }
                }
                return true;
            }
            if i64::from(span.max()) < low - 1 {
                match span.next() {
                    Some(next) => {
                        previous = Some(current);
                        current = next;
                        continue;
                    }
                    None => {
                        let id = self.allocate(min, max, flags);
                        self.spans[current.0].set_next(Some(id));
                        return true;
                    }
                }
            }
            self.merge_into(current, min, max, flags);
            return true;
        }
    }

    /// Merge `min..max` into a span it touches, absorbing spans above it
    fn merge_into(&mut self, target: SpanId, min: i32, max: i32, flags: u32) {
        let span = &mut self.spans[target.0];
        if min < span.min() {
            span.set_min(min);
        }
        if max == span.max() {
            span.set_flags(span.flags() | flags);
            return;
        }
        if span.max() > max {
            return;
        }

        let reach = i64::from(max) + 1;
        let mut next = span.next();
        loop {
            let above = match next {
                Some(id) if i64::from(self.spans[id.0].min()) <= reach => id,
                _ => {
                    // Nothing above is reached: the new interval is the top.
                    let span = &mut self.spans[target.0];
                    span.set_max(max);
                    span.set_flags(flags);
                    span.set_next(next);
                    return;
                }
            };

            let (above_max, above_flags, above_next) = {
                let s = &self.spans[above.0];
                (s.max(), s.flags(), s.next())
            };
            self.release(above);

            if above_max >= max {
                // The span above caps the merge.
                let span = &mut self.spans[target.0];
                span.set_max(above_max);
                span.set_next(above_next);
                if above_max == max {
                    span.set_flags(above_flags | flags);
                } else {
                    span.set_flags(above_flags);
                }
                return;
            }
            // Swallowed whole, keep climbing.
            next = above_next;
        }
    }

    fn allocate(&mut self, min: i32, max: i32, flags: u32) -> SpanId {
        let span = HeightSpan::from_checked(min, max, flags);
        match self.free.pop() {
            Some(id) => {
                self.spans[id.0] = span;
                self.live[id.0] = true;
                id
            }
            None => {
                self.spans.push(span);
                self.live.push(true);
                SpanId(self.spans.len() - 1)
            }
        }
    }

    fn release(&mut self, id: SpanId) {
        self.spans[id.0].set_next(None);
        self.live[id.0] = false;
        self.free.push(id);
    }

    #[inline]
    fn is_live(&self, id: SpanId) -> bool {
        self.live.get(id.0).copied().unwrap_or(false)
    }

    /// Lowest span of a column, or `None` for empty or out-of-grid cells
    pub fn first_span(&self, width_index: i32, depth_index: i32) -> Option<SpanId> {
        let cell = self.field.grid_index(width_index, depth_index)?;
        self.columns.get(&cell).copied()
    }

    /// Look up a span by id
    ///
    /// Returns `None` once a later `add_span` has merged the span away. A
    /// released slot is reused by the next new span, so ids should not be
    /// held across insertions.
    pub fn span(&self, id: SpanId) -> Option<&HeightSpan> {
        if self.is_live(id) {
            self.spans.get(id.0)
        } else {
            None
        }
    }

    /// Mutable access for passes that rewrite span flags
    pub fn span_mut(&mut self, id: SpanId) -> Option<&mut HeightSpan> {
        if self.is_live(id) {
            self.spans.get_mut(id.0)
        } else {
            None
        }
    }

    /// Iterate a column from bottom to top
    ///
    /// Out-of-grid cells yield an empty iterator.
    pub fn column(&self, width_index: i32, depth_index: i32) -> ColumnIter<'_> {
        ColumnIter {
            spans: &self.spans,
            next: self.first_span(width_index, depth_index),
        }
    }

    /// Iterate every span together with its cell coordinates
    ///
    /// Order is depth-major: all cells of depth row 0 by width, then row 1,
    /// and so on, each column bottom to top. Empty columns are skipped
    /// without being visited.
    pub fn spans(&self) -> impl Iterator<Item = (i32, i32, &HeightSpan)> + '_ {
        let depth = self.field.depth().max(1) as usize;
        let mut cells: Vec<(i32, i32)> = self
            .columns
            .keys()
            .map(|&cell| ((cell / depth) as i32, (cell % depth) as i32))
            .collect();
        cells.sort_unstable_by_key(|&(w, d)| (d, w));
        cells
            .into_iter()
            .flat_map(move |(w, d)| self.column(w, d).map(move |(_, span)| (w, d, span)))
    }

    /// Number of live spans
    #[inline]
    pub fn span_count(&self) -> usize {
        self.spans.len() - self.free.len()
    }

    /// Whether any column holds a span
    #[inline]
    pub fn has_spans(&self) -> bool {
        self.span_count() > 0
    }
}

/// Iterator over one column of a [`SolidHeightfield`]
pub struct ColumnIter<'a> {
    spans: &'a [HeightSpan],
    next: Option<SpanId>,
}

impl<'a> Iterator for ColumnIter<'a> {
    type Item = (SpanId, &'a HeightSpan);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let span = &self.spans[id.0];
        self.next = span.next();
        Some((id, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn test_heightfield() -> SolidHeightfield {
        SolidHeightfield::from_field(GridField::from_vec3(
            Vec3::ZERO,
            Vec3::new(4.0, 10.0, 3.0),
            1.0,
            0.5,
        ))
    }

    fn column_of(hf: &SolidHeightfield, w: i32, d: i32) -> Vec<(i32, i32, u32)> {
        hf.column(w, d).map(|(_, s)| (s.min(), s.max(), s.flags())).collect()
    }

    #[test]
    fn test_rejects_invalid_input() {
        let mut hf = test_heightfield();
        assert!(!hf.add_span(-1, 0, 0, 1, 0));
        assert!(!hf.add_span(4, 0, 0, 1, 0));
        assert!(!hf.add_span(0, 3, 0, 1, 0));
        assert!(!hf.add_span(0, 0, -1, 1, 0));
        assert!(!hf.add_span(0, 0, 5, 4, 0));
        assert!(!hf.has_spans());
    }

    #[test]
    fn test_zero_thickness_widened() {
        let mut hf = test_heightfield();
        assert!(hf.add_span(0, 0, 3, 3, 1));
        assert_eq!(column_of(&hf, 0, 0), vec![(3, 4, 1)]);
    }

    #[test]
    fn test_separate_spans_sorted() {
        let mut hf = test_heightfield();
        assert!(hf.add_span(1, 1, 10, 12, 1));
        assert!(hf.add_span(1, 1, 0, 2, 2));
        assert!(hf.add_span(1, 1, 20, 25, 3));
        assert!(hf.add_span(1, 1, 5, 7, 4));
        assert_eq!(
            column_of(&hf, 1, 1),
            vec![(0, 2, 2), (5, 7, 4), (10, 12, 1), (20, 25, 3)]
        );
        assert_eq!(hf.span_count(), 4);
    }

    #[test]
    fn test_adjacent_spans_merge() {
        let mut hf = test_heightfield();
        hf.add_span(0, 0, 0, 4, 1);
        hf.add_span(0, 0, 5, 8, 2);
        assert_eq!(column_of(&hf, 0, 0), vec![(0, 8, 2)]);
    }

    #[test]
    fn test_merge_flag_rules() {
        let mut hf = test_heightfield();
        // Same top: flags combine.
        hf.add_span(0, 0, 2, 6, 0b01);
        hf.add_span(0, 0, 0, 6, 0b10);
        assert_eq!(column_of(&hf, 0, 0), vec![(0, 6, 0b11)]);

        // Existing span reaches higher: its flags win.
        hf.add_span(1, 0, 0, 10, 0b01);
        hf.add_span(1, 0, 2, 5, 0b10);
        assert_eq!(column_of(&hf, 1, 0), vec![(0, 10, 0b01)]);

        // New span reaches higher: its flags win.
        hf.add_span(2, 0, 0, 5, 0b01);
        hf.add_span(2, 0, 3, 9, 0b10);
        assert_eq!(column_of(&hf, 2, 0), vec![(0, 9, 0b10)]);
    }

    #[test]
    fn test_merge_absorbs_spans_above() {
        let mut hf = test_heightfield();
        hf.add_span(0, 1, 0, 2, 1);
        hf.add_span(0, 1, 4, 6, 2);
        hf.add_span(0, 1, 8, 10, 4);
        hf.add_span(0, 1, 20, 22, 8);
        assert_eq!(hf.span_count(), 4);

        // Swallows 4..6, ends inside 8..10.
        hf.add_span(0, 1, 1, 9, 16);
        assert_eq!(column_of(&hf, 0, 1), vec![(0, 10, 4), (20, 22, 8)]);
        assert_eq!(hf.span_count(), 2);

        // Ends exactly at an existing top.
        hf.add_span(0, 1, 9, 22, 32);
        assert_eq!(column_of(&hf, 0, 1), vec![(0, 22, 40)]);

        // Freed slots are reused.
        hf.add_span(0, 1, 30, 31, 0);
        assert_eq!(hf.span_count(), 2);
    }

    #[test]
    fn test_merge_past_top() {
        let mut hf = test_heightfield();
        hf.add_span(3, 2, 0, 2, 1);
        hf.add_span(3, 2, 4, 6, 2);
        hf.add_span(3, 2, 1, 15, 4);
        assert_eq!(column_of(&hf, 3, 2), vec![(0, 15, 4)]);
    }

    #[test]
    fn test_iteration_order() {
        let mut hf = test_heightfield();
        hf.add_span(2, 0, 0, 1, 0);
        hf.add_span(0, 1, 0, 1, 0);
        hf.add_span(0, 1, 3, 4, 0);
        hf.add_span(3, 2, 0, 1, 0);
        let cells: Vec<_> = hf.spans().map(|(w, d, s)| (w, d, s.min())).collect();
        assert_eq!(cells, vec![(2, 0, 0), (0, 1, 0), (0, 1, 3), (3, 2, 0)]);
    }

    #[test]
    fn test_span_flags_rewritten_in_place() {
        let mut hf = test_heightfield();
        hf.add_span(1, 2, 0, 3, 0);
        let id = hf.first_span(1, 2).unwrap();
        hf.span_mut(id).unwrap().set_flags(7);
        assert_eq!(hf.span(id).unwrap().flags(), 7);
        assert_eq!(hf.first_span(9, 9), None);
        assert_eq!(hf.column(-1, 0).count(), 0);
    }

    #[test]
    fn test_edit_field_resize_clears() {
        let mut hf = test_heightfield();
        hf.add_span(0, 0, 0, 1, 0);
        hf.edit_field(|editor| editor.set_cell_height(0.25));
        assert!(hf.has_spans());
        assert_eq!(hf.field().cell_height(), 0.25);

        hf.edit_field(|editor| editor.set_cell_size(0.5));
        assert!(!hf.has_spans());
        assert_eq!(hf.field().width(), 8);
        assert!(hf.add_span(7, 5, 0, 1, 0));

        hf.edit_field(|editor| editor.set_bounds(&[0.0], &[1.0]));
        assert!(hf.has_spans());
    }

    #[test]
    fn test_degenerate_cell_size() {
        let mut hf = SolidHeightfield::new(0.0, 0.0);
        assert_eq!(hf.field().width(), i32::MAX);
        assert_eq!(hf.field().depth(), i32::MAX);
        assert!(!hf.has_spans());

        assert!(hf.add_span(i32::MAX - 1, i32::MAX - 1, 0, 4, 1));
        assert!(hf.add_span(0, 0, 2, 3, 2));
        assert!(!hf.add_span(i32::MAX, 0, 0, 1, 0));
        let cells: Vec<_> = hf.spans().map(|(w, d, _)| (w, d)).collect();
        assert_eq!(cells, vec![(0, 0), (i32::MAX - 1, i32::MAX - 1)]);
    }

    #[test]
    fn test_edit_field_shrinks_cell_size() {
        let mut hf = test_heightfield();
        hf.add_span(1, 1, 0, 2, 0);

        hf.edit_field(|editor| editor.set_cell_size(0.0));
        assert!(!hf.has_spans());
        assert_eq!(hf.field().width(), i32::MAX);
        assert!(hf.add_span(1_000_000, 2_000_000, 0, 1, 3));
        assert_eq!(column_of(&hf, 1_000_000, 2_000_000), vec![(0, 1, 3)]);

        hf.edit_field(|editor| editor.set_cell_size(1e-3));
        assert!(!hf.has_spans());
        assert!(hf.add_span(5, 5, 1, 2, 0));
    }

    #[test]
    fn test_height_limits() {
        let mut hf = test_heightfield();
        hf.add_span(0, 0, 0, 5, 1);
        assert!(hf.add_span(0, 0, 10, i32::MAX, 2));
        assert_eq!(column_of(&hf, 0, 0), vec![(0, 5, 1), (10, i32::MAX, 2)]);

        // Touches the top span at the limit and merges into it.
        assert!(hf.add_span(0, 0, i32::MAX, i32::MAX, 4));
        assert_eq!(column_of(&hf, 0, 0), vec![(0, 5, 1), (10, i32::MAX, 6)]);

        assert!(hf.add_span(1, 0, i32::MAX, i32::MAX, 8));
        assert_eq!(column_of(&hf, 1, 0), vec![(i32::MAX - 1, i32::MAX, 8)]);

        // Merging upward to the limit absorbs everything above.
        assert!(hf.add_span(0, 0, 3, i32::MAX, 16));
        assert_eq!(column_of(&hf, 0, 0), vec![(0, i32::MAX, 22)]);

        assert!(hf.add_span(2, 0, 0, i32::MAX, 1));
        assert!(hf.add_span(2, 0, 0, 0, 2));
        assert_eq!(column_of(&hf, 2, 0), vec![(0, i32::MAX, 1)]);
    }

    #[test]
    fn test_merged_span_ids_released() {
        let mut hf = test_heightfield();
        hf.add_span(0, 2, 0, 2, 1);
        hf.add_span(0, 2, 4, 6, 2);
        let upper = hf.span(hf.first_span(0, 2).unwrap()).unwrap().next().unwrap();
        assert!(hf.span(upper).is_some());

        hf.add_span(0, 2, 1, 5, 4);
        assert_eq!(hf.span(upper), None);
        assert!(hf.span_mut(upper).is_none());
        assert_eq!(hf.span(SpanId(99)), None);

        // The slot comes back to life for the next new span.
        hf.add_span(1, 2, 0, 1, 8);
        assert_eq!(hf.first_span(1, 2), Some(upper));
        assert_eq!(hf.span(upper).map(|s| s.flags()), Some(8));
    }

    #[test]
    fn test_random_columns_stay_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut hf = test_heightfield();
        let mut solid = vec![false; 128];
        for _ in 0..200 {
            let min = rng.gen_range(0..100);
            let max = min + rng.gen_range(0..12);
            assert!(hf.add_span(2, 1, min, max, rng.gen()));
            for cell in solid.iter_mut().take(max.max(min + 1) as usize).skip(min as usize) {
                *cell = true;
            }
        }

        let column = column_of(&hf, 2, 1);
        for pair in column.windows(2) {
            // Sorted with at least one empty unit between neighbours.
            assert!(pair[0].1 + 1 < pair[1].0);
        }
        for (h, _) in solid.iter().enumerate().filter(|(_, s)| **s) {
            let h = h as i32;
            assert!(column.iter().any(|(min, max, _)| *min <= h && h < *max));
        }
        assert_eq!(hf.span_count(), column.len());
    }
}
