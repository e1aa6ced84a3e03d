//! Fixed-height row virtualization. Every row is [`ROW_HEIGHT`] tall, so the
//! visible window is computed directly from the scroll offset.

use std::ops::Range;

pub const ROW_HEIGHT: f32 = 40.0;
pub const HEADER_HEIGHT: f32 = 48.0;
pub const DEFAULT_OVERSCAN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub row_height: f32,
    pub overscan: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSCAN)
    }
}

/// Rows to draw plus the blank space standing in for the rows around them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisibleWindow {
    pub start: usize,
    pub end: usize,
    pub space_before: f32,
    pub space_after: f32,
}

impl VisibleWindow {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Viewport {
    pub fn new(overscan: usize) -> Self {
        Self {
            row_height: ROW_HEIGHT,
            overscan,
        }
    }

    pub fn content_height(&self, total_rows: usize) -> f32 {
        total_rows as f32 * self.row_height
    }

    /// Height left for rows once the header is taken out of the table region.
    pub fn body_height(table_height: f32) -> f32 {
        (table_height - HEADER_HEIGHT).max(0.0)
    }

    pub fn window(&self, total_rows: usize, scroll_offset: f32, viewport_height: f32) -> VisibleWindow {
        if total_rows == 0 || self.row_height <= 0.0 {
            return VisibleWindow::default();
        }

        let viewport_height = viewport_height.max(0.0);
        let max_offset = (self.content_height(total_rows) - viewport_height).max(0.0);
        let offset = scroll_offset.clamp(0.0, max_offset);

        let first_visible = (offset / self.row_height).floor() as usize;
        let past_last_visible = ((offset + viewport_height) / self.row_height).ceil() as usize;

        let start = first_visible.saturating_sub(self.overscan).min(total_rows);
        let end = past_last_visible
            .saturating_add(self.overscan)
            .min(total_rows)
            .max(start);

        VisibleWindow {
            start,
            end,
            space_before: start as f32 * self.row_height,
            space_after: (total_rows - end) as f32 * self.row_height,
        }
    }
}
