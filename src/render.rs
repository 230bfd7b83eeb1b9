//! Bookkeeping for incremental, focus-preserving list rendering.
//!
//! The clipboard panel can hold hundreds of cards.  Building all of them
//! in one go stalls the first frame, so rendering is split into batches:
//! a small first batch is built synchronously and the rest is scheduled
//! from idle callbacks.  The helpers here hold the pure part of that
//! process (batch ranges, selection fix-ups, scroll targets) so the GTK
//! views stay thin.

use crate::search::RenderCandidate;
use std::ops::Range;

/// Splits `total` items into rendering batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    total: usize,
    rendered: usize,
    initial_chunk: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    /// `initial_chunk` is raised to at least 1 and `chunk_size` to at least
    /// `initial_chunk`.
    pub fn new(total: usize, initial_chunk: usize, chunk_size: usize) -> Self {
        let initial_chunk = initial_chunk.max(1);
        Self {
            total,
            rendered: 0,
            initial_chunk,
            chunk_size: chunk_size.max(initial_chunk),
        }
    }

    /// The next range of indices to build, or `None` when done.
    pub fn next_batch(&mut self) -> Option<Range<usize>> {
        if self.is_done() {
            return None;
        }
        let size = if self.rendered == 0 {
            self.initial_chunk
        } else {
            self.chunk_size
        };
        let start = self.rendered;
        let end = (start + size).min(self.total);
        self.rendered = end;
        Some(start..end)
    }

    pub fn is_done(&self) -> bool {
        self.rendered >= self.total
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Clamp `selected` into the original-index span covered by `candidates`.
///
/// Does nothing when `enforce_bounds` is off or there are no candidates.
pub fn adjust_selection_for_candidates(
    selected: Option<usize>,
    candidates: &[RenderCandidate],
    enforce_bounds: bool,
) -> Option<usize> {
    let (Some(first), Some(last)) = (candidates.first(), candidates.last()) else {
        return selected;
    };
    if !enforce_bounds {
        return selected;
    }
    match selected {
        None => Some(first.index),
        Some(i) => Some(i.clamp(first.index, last.index)),
    }
}

/// Without a filter the selection must point into `[0, len - 1]`.
///
/// Returns `None` when nothing needs to change.
pub fn clamp_to_rendered(selected: Option<usize>, len: usize) -> Option<usize> {
    let max = len.checked_sub(1)?;
    match selected {
        None => Some(0),
        Some(i) if i > max => Some(max),
        Some(_) => None,
    }
}

/// With a filter active, a selection that is not among the rendered
/// entries moves to the first rendered one.
///
/// Returns `None` when nothing needs to change.
pub fn reselect_after_chunk(selected: Option<usize>, rendered: &[usize]) -> Option<usize> {
    let first = *rendered.first()?;
    match selected {
        Some(i) if rendered.contains(&i) => None,
        _ => Some(first),
    }
}

/// Step through the rendered subset (original indices, in display order).
///
/// Returns the new original index, or `None` if there is nothing to move
/// to.  A selection outside the subset jumps to the first entry when
/// moving forward and the last one when moving back.
pub fn move_within(rendered: &[usize], selected: Option<usize>, delta: isize) -> Option<usize> {
    if rendered.is_empty() {
        return None;
    }
    let pos = selected
        .and_then(|sel| rendered.iter().position(|&i| i == sel))
        .map(|pos| crate::list::step_clamped(pos, delta, rendered.len()))
        .unwrap_or(if delta > 0 { 0 } else { rendered.len() - 1 });
    Some(rendered[pos])
}

/// New scroll position that brings `[item_start, item_start + item_len)`
/// into the viewport, or `None` if it is already fully visible.
pub fn scroll_target(item_start: f64, item_len: f64, view_start: f64, view_len: f64, upper: f64) -> Option<f64> {
    let item_end = item_start + item_len;
    if item_start < view_start {
        Some(item_start.max(0.0))
    } else if item_end > view_start + view_len {
        Some((item_end - view_len).min(upper - view_len).max(0.0))
    } else {
        None
    }
}

/// Height estimate for text cards, from the longest preview.
pub fn suggested_item_height(candidates: &[RenderCandidate], item_width: i32, base_height: i32) -> i32 {
    const LINE_HEIGHT: i32 = 18;
    let chars_per_line = (item_width / 8).max(20) as usize;
    let max_lines = candidates
        .iter()
        .map(|c| c.content.trim().chars().count())
        .filter(|&len| len > 0)
        .map(|len| (len / chars_per_line + 1).clamp(1, 6) as i32)
        .max()
        .unwrap_or(0);
    if max_lines > 1 {
        base_height.max(max_lines * LINE_HEIGHT + 24)
    } else {
        base_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(index: usize, content: &str) -> RenderCandidate {
        RenderCandidate {
            index,
            id: index.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn chunk_plan_batches() {
        let mut plan = ChunkPlan::new(250, 48, 96);
        assert_eq!(plan.next_batch(), Some(0..48));
        assert_eq!(plan.next_batch(), Some(48..144));
        assert_eq!(plan.next_batch(), Some(144..240));
        assert_eq!(plan.next_batch(), Some(240..250));
        assert!(plan.is_done());
        assert_eq!(plan.next_batch(), None);
        assert_eq!(plan.rendered(), 250);
    }

    #[test]
    fn chunk_plan_sanitises_sizes() {
        let mut plan = ChunkPlan::new(5, 0, 0);
        assert_eq!(plan.next_batch(), Some(0..1));
        assert_eq!(plan.next_batch(), Some(1..2));

        let mut plan = ChunkPlan::new(0, 48, 96);
        assert!(plan.is_done());
        assert_eq!(plan.next_batch(), None);
    }

    #[test]
    fn adjust_selection_clamps_to_candidate_span() {
        let cands = vec![cand(3, "a"), cand(7, "b")];
        assert_eq!(adjust_selection_for_candidates(Some(1), &cands, true), Some(3));
        assert_eq!(adjust_selection_for_candidates(Some(9), &cands, true), Some(7));
        assert_eq!(adjust_selection_for_candidates(Some(5), &cands, true), Some(5));
        assert_eq!(adjust_selection_for_candidates(Some(9), &cands, false), Some(9));
        assert_eq!(adjust_selection_for_candidates(Some(9), &[], true), Some(9));
    }

    #[test]
    fn clamp_to_rendered_cases() {
        assert_eq!(clamp_to_rendered(Some(10), 4), Some(3));
        assert_eq!(clamp_to_rendered(None, 4), Some(0));
        assert_eq!(clamp_to_rendered(Some(2), 4), None);
        assert_eq!(clamp_to_rendered(Some(2), 0), None);
    }

    #[test]
    fn reselect_moves_hidden_selection_to_first_match() {
        assert_eq!(reselect_after_chunk(Some(0), &[2, 5]), Some(2));
        assert_eq!(reselect_after_chunk(None, &[2, 5]), Some(2));
        assert_eq!(reselect_after_chunk(Some(5), &[2, 5]), None);
        assert_eq!(reselect_after_chunk(Some(5), &[]), None);
    }

    #[test]
    fn move_within_is_clamped_and_non_circular() {
        let rendered = [1, 4, 6];
        assert_eq!(move_within(&rendered, Some(4), 1), Some(6));
        assert_eq!(move_within(&rendered, Some(6), 1), Some(6));
        assert_eq!(move_within(&rendered, Some(1), -1), Some(1));
        assert_eq!(move_within(&rendered, Some(4), -1), Some(1));
    }

    #[test]
    fn move_within_from_hidden_selection() {
        let rendered = [1, 4, 6];
        assert_eq!(move_within(&rendered, Some(2), 1), Some(1));
        assert_eq!(move_within(&rendered, Some(2), -1), Some(6));
        assert_eq!(move_within(&rendered, None, 1), Some(1));
        assert_eq!(move_within(&[], Some(2), 1), None);
    }

    #[test]
    fn scroll_target_brings_item_into_view() {
        // Item left of the viewport.
        assert_eq!(scroll_target(100.0, 50.0, 200.0, 300.0, 1000.0), Some(100.0));
        // Item right of the viewport.
        assert_eq!(scroll_target(480.0, 50.0, 200.0, 300.0, 1000.0), Some(230.0));
        // Already visible.
        assert_eq!(scroll_target(250.0, 50.0, 200.0, 300.0, 1000.0), None);
        // Never past the end of the content.
        assert_eq!(scroll_target(980.0, 50.0, 0.0, 300.0, 1000.0), Some(700.0));
    }

    #[test]
    fn item_height_grows_with_long_text() {
        let short = vec![cand(0, "short")];
        assert_eq!(suggested_item_height(&short, 320, 100), 100);

        // 320 / 8 = 40 chars per line; 130 chars → 4 lines → 96 px.
        let long = vec![cand(0, &"x".repeat(130))];
        assert_eq!(suggested_item_height(&long, 320, 60), 96);
        assert_eq!(suggested_item_height(&long, 320, 120), 120);

        // Capped at 6 lines.
        let huge = vec![cand(0, &"x".repeat(10_000))];
        assert_eq!(suggested_item_height(&huge, 320, 10), 6 * 18 + 24);
        assert_eq!(suggested_item_height(&[], 320, 42), 42);
    }
}
