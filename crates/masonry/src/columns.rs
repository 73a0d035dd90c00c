//! Per-column accumulated heights for a single reflow pass.

use smallvec::{SmallVec, smallvec};

use crate::config::MAX_COLUMNS;

/// Accumulated height of each column during one reflow pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    heights: SmallVec<[f32; 4]>,
}

impl ColumnState {
    /// `count` empty columns, clamped to `1..=MAX_COLUMNS`.
    pub fn new(count: usize) -> Self {
        Self {
            heights: smallvec![0.0; count.clamp(1, MAX_COLUMNS)],
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Index and height of the shortest column. Ties go to the lowest index.
    pub fn shortest(&self) -> (usize, f32) {
        let mut best = (0, self.heights.first().copied().unwrap_or(0.0));
        for (index, &height) in self.heights.iter().enumerate().skip(1) {
            if height < best.1 {
                best = (index, height);
            }
        }
        best
    }

    /// Stack an item of `height` onto `column`, returning the item's top.
    pub fn place(&mut self, column: usize, height: f32, gap: f32) -> f32 {
        let Some(slot) = self.heights.get_mut(column) else {
            return 0.0;
        };
        let top = *slot;
        *slot += height + gap;
        top
    }

    /// Height of the tallest column, gap included.
    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(0.0, f32::max)
    }

    /// Per-column heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}
