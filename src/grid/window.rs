//! Viewport windowing: which rows must exist right now, and where.
//!
//! The grid renders O(visible window) widgets no matter how large the
//! collection grows; this module decides the window. Heights use a fixed
//! per-row estimate, which is exact enough because cards are card-sized
//! rather than content-driven.

use std::ops::Range;

use crate::grid::GridError;

/// Scroll state of the hosting viewport, sampled at event time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scroll_offset: f64,
    pub viewport_height: f64,
}

/// The materialization plan for one scroll/resize tick.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    /// Row indices to keep realized, as a half-open range.
    pub rows: Range<usize>,
    /// Estimated height of every row in pixels.
    pub row_height: f64,
    /// Total scrollable extent in pixels.
    pub total_height: f64,
}

impl WindowPlan {
    /// Vertical pixel offset of a row under the fixed-height model.
    pub fn offset_of(&self, row_index: usize) -> f64 {
        row_index as f64 * self.row_height
    }

    /// `(row_index, pixel_offset)` for every row in the window.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows.clone().map(|row| (row, self.offset_of(row)))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Computes the contiguous row window overlapping the viewport, extended by
/// `overscan` rows on each side and clamped to `[0, row_count)`.
///
/// Pure: identical inputs always produce identical plans. An empty grid
/// yields an empty window with zero extent; a scroll offset past the end
/// clamps to the last valid window.
pub fn compute_window(
    row_count: usize,
    estimated_row_height: f64,
    overscan: usize,
    viewport: ViewportState,
) -> Result<WindowPlan, GridError> {
    if !estimated_row_height.is_finite() || estimated_row_height <= 0.0 {
        return Err(GridError::InvalidRowHeight(estimated_row_height));
    }
    if row_count == 0 {
        return Ok(WindowPlan {
            rows: 0..0,
            row_height: estimated_row_height,
            total_height: 0.0,
        });
    }

    let total_height = row_count as f64 * estimated_row_height;
    let offset = viewport.scroll_offset.clamp(0.0, total_height);
    let span = viewport.viewport_height.max(0.0);

    let first_visible = ((offset / estimated_row_height).floor() as usize).min(row_count - 1);
    let last_visible = (((offset + span) / estimated_row_height).ceil() as usize)
        .clamp(first_visible + 1, row_count);

    let first = first_visible.saturating_sub(overscan);
    let last = last_visible.saturating_add(overscan).min(row_count);

    Ok(WindowPlan {
        rows: first..last,
        row_height: estimated_row_height,
        total_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport(scroll_offset: f64, viewport_height: f64) -> ViewportState {
        ViewportState {
            scroll_offset,
            viewport_height,
        }
    }

    #[test]
    fn test_empty_grid() {
        let plan = compute_window(0, 350.0, 5, viewport(0.0, 800.0)).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.total_height, 0.0);
    }

    #[test]
    fn test_invalid_row_height_rejected() {
        assert!(matches!(
            compute_window(10, 0.0, 5, viewport(0.0, 800.0)),
            Err(GridError::InvalidRowHeight(_))
        ));
        assert!(matches!(
            compute_window(10, f64::NAN, 5, viewport(0.0, 800.0)),
            Err(GridError::InvalidRowHeight(_))
        ));
    }

    #[test]
    fn test_window_at_top() {
        // 800px viewport over 350px rows shows rows 0..3; overscan 2 extends
        // to 0..5.
        let plan = compute_window(100, 350.0, 2, viewport(0.0, 800.0)).unwrap();
        assert_eq!(plan.rows, 0..5);
        assert_eq!(plan.offset_of(4), 1400.0);
        assert_eq!(plan.total_height, 35_000.0);
    }

    #[test]
    fn test_window_mid_scroll() {
        let plan = compute_window(100, 350.0, 0, viewport(3500.0, 700.0)).unwrap();
        assert_eq!(plan.rows, 10..12);
    }

    #[test]
    fn test_scroll_past_end_clamps() {
        let plan = compute_window(10, 350.0, 1, viewport(1_000_000.0, 800.0)).unwrap();
        assert!(!plan.is_empty());
        assert!(plan.rows.end <= 10);
        assert!(plan.rows.contains(&9));
    }

    #[test]
    fn test_zero_height_viewport_keeps_one_row() {
        let plan = compute_window(10, 350.0, 0, viewport(700.0, 0.0)).unwrap();
        assert_eq!(plan.rows, 2..3);
    }

    #[test]
    fn test_offsets_follow_fixed_height_model() {
        let plan = compute_window(50, 350.0, 3, viewport(7000.0, 800.0)).unwrap();
        for (row, offset) in plan.offsets() {
            assert_eq!(offset, row as f64 * 350.0);
        }
    }

    proptest! {
        #[test]
        fn prop_window_is_subset_and_idempotent(
            row_count in 0usize..10_000,
            scroll in 0.0f64..5_000_000.0,
            height in 0.0f64..4_000.0,
            overscan in 0usize..20,
        ) {
            let state = viewport(scroll, height);
            let plan = compute_window(row_count, 350.0, overscan, state).unwrap();
            prop_assert!(plan.rows.end <= row_count);
            prop_assert!(plan.rows.start <= plan.rows.end);
            if row_count > 0 {
                prop_assert!(!plan.is_empty());
            }

            let again = compute_window(row_count, 350.0, overscan, state).unwrap();
            prop_assert_eq!(plan, again);
        }

        #[test]
        fn prop_more_overscan_never_shrinks_window(
            row_count in 1usize..10_000,
            scroll in 0.0f64..5_000_000.0,
            height in 0.0f64..4_000.0,
            overscan in 0usize..20,
        ) {
            let state = viewport(scroll, height);
            let narrow = compute_window(row_count, 350.0, overscan, state).unwrap();
            let wide = compute_window(row_count, 350.0, overscan + 3, state).unwrap();
            prop_assert!(wide.rows.start <= narrow.rows.start);
            prop_assert!(wide.rows.end >= narrow.rows.end);
        }
    }
}
