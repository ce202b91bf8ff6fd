//! Edge detection on a host layout snapshot.

use crate::host::LayoutSnapshot;

/// True when the first item is visible and its top sits at the viewport top.
///
/// An empty list is at both edges so that pulls still work on it.
pub fn at_top_edge(layout: &LayoutSnapshot) -> bool {
    if layout.item_count == 0 {
        return true;
    }
    layout.first_visible == 0 && layout.first_item_top == 0
}

/// True when the last item is visible and its bottom is at or above the viewport bottom.
pub fn at_bottom_edge(layout: &LayoutSnapshot) -> bool {
    if layout.item_count == 0 {
        return true;
    }
    layout.last_visible == layout.item_count - 1
        && layout.last_item_bottom <= layout.viewport_height
}

/// Which edge a drag is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeHit {
    Top,
    Bottom,
}

/// Resolve both edges into one. On a list short enough to show both, the top wins.
pub fn edge_hit(layout: &LayoutSnapshot) -> Option<EdgeHit> {
    if at_top_edge(layout) {
        Some(EdgeHit::Top)
    } else if at_bottom_edge(layout) {
        Some(EdgeHit::Bottom)
    } else {
        None
    }
}
