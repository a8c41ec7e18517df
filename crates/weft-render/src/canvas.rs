#![forbid(unsafe_code)]

//! Clipped drawing surface.
//!
//! A [`Canvas`] wraps a buffer with a clip rectangle and an origin
//! translation. Widgets paint through a canvas in canvas-local coordinates;
//! everything outside the clip is silently dropped, so paint code never
//! needs its own bounds checks.

use weft_core::geometry::Rect;
use weft_core::width::rune_width;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::style::Style;

/// Box-drawing characters for [`Canvas::draw_border`].
const BORDER_HORIZONTAL: char = '─';
const BORDER_VERTICAL: char = '│';
const BORDER_TOP_LEFT: char = '┌';
const BORDER_TOP_RIGHT: char = '┐';
const BORDER_BOTTOM_LEFT: char = '└';
const BORDER_BOTTOM_RIGHT: char = '┘';

/// A clipped drawing surface over a sub-rectangle of a [`Buffer`].
#[derive(Debug)]
pub struct Canvas<'a> {
    buffer: &'a mut Buffer,
    /// Clip region in buffer coordinates.
    clip: Rect,
}

impl<'a> Canvas<'a> {
    /// A canvas spanning the whole buffer.
    pub fn new(buffer: &'a mut Buffer) -> Self {
        let clip = buffer.bounds();
        Self { buffer, clip }
    }

    /// A canvas clipped to `region` (intersected with the buffer bounds).
    ///
    /// Canvas-local coordinates are translated by the region's origin.
    pub fn with_region(buffer: &'a mut Buffer, region: Rect) -> Self {
        let clip = buffer.bounds().intersection(&region);
        Self { buffer, clip }
    }

    /// The clip region in buffer coordinates.
    #[must_use]
    pub const fn clip(&self) -> Rect {
        self.clip
    }

    /// Width of the drawable region.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.clip.width
    }

    /// Height of the drawable region.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.clip.height
    }

    /// Write one cell at canvas-local `(x, y)`, clipped.
    ///
    /// A double-width cell whose trailing half would cross the clip's right
    /// edge is replaced with a space, mirroring the buffer's own edge rule.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(bx) = self.clip.x.checked_add(x) else {
            return;
        };
        let Some(by) = self.clip.y.checked_add(y) else {
            return;
        };
        if !self.clip.contains(bx, by) {
            return;
        }
        if cell.width() == 2 && !self.clip.contains(bx + 1, by) {
            self.buffer.set_cell(bx, by, Cell::styled(' ', cell.style));
            return;
        }
        self.buffer.set_cell(bx, by, cell);
    }

    /// Draw text starting at canvas-local `(x, y)`.
    ///
    /// The write cursor advances by each codepoint's display width.
    /// Zero-width codepoints (ZWJ, ZWSP, combining marks, variation
    /// selectors) occupy no columns and are not emitted.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let mut cx = x;
        for ch in text.chars() {
            let width = rune_width(ch);
            if width == 0 {
                continue;
            }
            if u32::from(cx) + width as u32 > u32::from(self.clip.width) {
                break;
            }
            self.set(cx, y, Cell::styled(ch, style));
            cx += width as u16;
        }
    }

    /// Fill a canvas-local rectangle with styled spaces.
    pub fn draw_rect(&mut self, rect: Rect, style: Style) {
        self.fill(rect, Cell::styled(' ', style));
    }

    /// Fill a canvas-local rectangle with the given cell.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Draw a single-line box border just inside a canvas-local rectangle.
    pub fn draw_border(&mut self, rect: Rect, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }

        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;

        for x in (rect.x + 1)..right {
            self.set(x, rect.y, Cell::styled(BORDER_HORIZONTAL, style));
            self.set(x, bottom, Cell::styled(BORDER_HORIZONTAL, style));
        }
        for y in (rect.y + 1)..bottom {
            self.set(rect.x, y, Cell::styled(BORDER_VERTICAL, style));
            self.set(right, y, Cell::styled(BORDER_VERTICAL, style));
        }

        self.set(rect.x, rect.y, Cell::styled(BORDER_TOP_LEFT, style));
        self.set(right, rect.y, Cell::styled(BORDER_TOP_RIGHT, style));
        self.set(rect.x, bottom, Cell::styled(BORDER_BOTTOM_LEFT, style));
        self.set(right, bottom, Cell::styled(BORDER_BOTTOM_RIGHT, style));
    }
}
