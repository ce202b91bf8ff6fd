//! The seam between the controller and whatever list widget renders it.
//!
//! The controller owns no widget. A thin adapter implements [`ListHost`] for a
//! concrete toolkit: it reports a layout snapshot on demand and applies the
//! offset, header height and footer visibility the controller decides on.

use crate::Result;

/// Layout of the host list at one instant
///
/// Pixel positions are relative to the viewport top and do not include the
/// over-scroll offset. When a refresh header is attached it is item 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSnapshot {
    /// Total number of items, header and footer rows included
    pub item_count: usize,
    /// Index of the first (partially) visible item
    pub first_visible: usize,
    /// Index of the last (partially) visible item
    pub last_visible: usize,
    /// Top pixel of the first visible item
    pub first_item_top: i32,
    /// Bottom pixel of the last visible item
    pub last_item_bottom: i32,
    pub viewport_height: i32,
}

impl LayoutSnapshot {
    /// Snapshot of a list with no items
    pub fn empty(viewport_height: i32) -> Self {
        Self {
            viewport_height,
            ..Default::default()
        }
    }
}

/// Scroll sink and layout source implemented by the UI adapter
///
/// The apply methods may fail on host lifecycle races (e.g. a draw during
/// teardown); the controller logs and ignores such failures.
pub trait ListHost {
    fn layout(&self) -> LayoutSnapshot;

    /// Shift the whole list content; negative reveals the top, positive the bottom
    fn apply_offset(&mut self, offset: i32) -> Result<()>;

    /// Resize the refresh header row
    fn apply_header_height(&mut self, height: i32) -> Result<()>;

    fn apply_footer_visibility(&mut self, visible: bool) -> Result<()>;
}
