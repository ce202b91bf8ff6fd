//! Terminal list that the over-scroll controller drives.
//!
//! Everything is measured in virtual pixels: one terminal row is
//! `row_pixels` pixels tall, so damping and thresholds work at a finer grain
//! than whole rows. Item 0 is the refresh header, the optional last item is
//! the load-more footer.

use overscroll_core::{LayoutSnapshot, ListHost, Result};

/// What one terminal row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRow {
    /// Space revealed by over-scroll
    Gap,
    Header,
    Item(usize),
    Footer,
}

/// Rows for a freshly loaded page
pub fn demo_items(start: usize, count: usize) -> Vec<String> {
    (start..start + count).map(|i| format!("Item {}", i)).collect()
}

#[derive(Debug, Clone)]
pub struct DemoList {
    items: Vec<String>,
    row_pixels: i32,
    viewport_height: i32,
    /// The list's own scroll position, independent of over-scroll
    scroll_top: i32,
    header_height: i32,
    footer_visible: bool,
    offset: i32,
}

impl DemoList {
    pub fn new(row_pixels: i32) -> Self {
        Self {
            items: Vec::new(),
            row_pixels: row_pixels.max(1),
            viewport_height: 0,
            scroll_top: 0,
            header_height: 0,
            footer_visible: false,
            offset: 0,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    pub fn extend(&mut self, items: Vec<String>) {
        self.items.extend(items);
    }

    pub fn row_pixels(&self) -> i32 {
        self.row_pixels
    }

    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport_height = rows as i32 * self.row_pixels;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    pub fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    pub fn scroll_top(&self) -> i32 {
        self.scroll_top
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn header_height(&self) -> i32 {
        self.header_height
    }

    pub fn footer_visible(&self) -> bool {
        self.footer_visible
    }

    fn item_count(&self) -> usize {
        1 + self.items.len() + usize::from(self.footer_visible)
    }

    fn item_height(&self, index: usize) -> i32 {
        if index == 0 {
            self.header_height
        } else {
            self.row_pixels
        }
    }

    pub fn content_height(&self) -> i32 {
        self.header_height
            + (self.items.len() as i32 + i32::from(self.footer_visible)) * self.row_pixels
    }

    pub fn max_scroll(&self) -> i32 {
        (self.content_height() - self.viewport_height).max(0)
    }

    /// Scroll the list itself; returns the distance actually scrolled
    ///
    /// Positive `dy` moves the content up.
    pub fn scroll_by(&mut self, dy: i32) -> i32 {
        let old = self.scroll_top;
        self.scroll_top = (old + dy).clamp(0, self.max_scroll());
        self.scroll_top - old
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll();
    }

    fn row_kind(&self, index: usize) -> ScreenRow {
        if index == 0 {
            ScreenRow::Header
        } else if index <= self.items.len() {
            ScreenRow::Item(index - 1)
        } else {
            ScreenRow::Footer
        }
    }

    /// What each of `rows` terminal rows shows, over-scroll applied
    pub fn screen_rows(&self, rows: u16) -> Vec<ScreenRow> {
        let mut screen = Vec::with_capacity(rows as usize);
        for r in 0..rows as i32 {
            let y = self.scroll_top + self.offset + r * self.row_pixels;
            screen.push(self.row_at(y));
        }
        screen
    }

    fn row_at(&self, y: i32) -> ScreenRow {
        if y < 0 {
            return ScreenRow::Gap;
        }
        let mut top = 0;
        for index in 0..self.item_count() {
            let bottom = top + self.item_height(index);
            if y < bottom {
                return self.row_kind(index);
            }
            top = bottom;
        }
        ScreenRow::Gap
    }
}

impl ListHost for DemoList {
    fn layout(&self) -> LayoutSnapshot {
        let count = self.item_count();
        let view_top = self.scroll_top;
        let view_bottom = self.scroll_top + self.viewport_height;

        let mut first = None;
        let mut last = (0, 0);
        let mut top = 0;
        for index in 0..count {
            let bottom = top + self.item_height(index);
            if first.is_none() && (bottom > view_top || (view_top == 0 && index == 0)) {
                first = Some((index, top - view_top));
            }
            if top < view_bottom || index == 0 {
                last = (index, bottom - view_top);
            }
            top = bottom;
        }
        let (first_visible, first_item_top) = first.unwrap_or((0, 0));

        LayoutSnapshot {
            item_count: count,
            first_visible,
            last_visible: last.0,
            first_item_top,
            last_item_bottom: last.1,
            viewport_height: self.viewport_height,
        }
    }

    fn apply_offset(&mut self, offset: i32) -> Result<()> {
        self.offset = offset;
        Ok(())
    }

    fn apply_header_height(&mut self, height: i32) -> Result<()> {
        self.header_height = height.max(0);
        Ok(())
    }

    fn apply_footer_visibility(&mut self, visible: bool) -> Result<()> {
        self.footer_visible = visible;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
        Ok(())
    }
}
