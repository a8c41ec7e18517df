#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! The `Buffer` is a 2D grid of [`Cell`]s addressed row-major:
//! `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`; dimensions never change after
//!    creation.
//! 2. Writing a double-width glyph at `(x, y)` with `x + 1 < width` places
//!    a continuation marker with the same style at `(x + 1, y)`.
//! 3. A double-width glyph that would straddle the right edge is replaced
//!    with a space instead.
//! 4. Out-of-bounds writes are silently dropped.
//!
//! Overwriting the head of a wide pair can leave its continuation cell
//! behind as a stale artifact; emission skips continuation markers, so the
//! artifact never reaches the terminal.

use weft_core::geometry::Rect;

use crate::cell::Cell;

/// A 2D grid of terminal cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a buffer of empty cells.
    ///
    /// # Panics
    ///
    /// Panics if width or height is 0.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0, "buffer width must be > 0");
        assert!(height > 0, "buffer height must be > 0");

        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    /// Buffer width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// The cell at `(x, y)`, or `None` out of bounds.
    #[inline]
    #[must_use]
    pub fn get_cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Write a cell at `(x, y)`.
    ///
    /// In-bounds writes of a double-width symbol also write a continuation
    /// marker with the same style at `(x + 1, y)`; at the right edge the
    /// glyph is replaced with a space so no glyph straddles the boundary.
    /// Out-of-bounds writes are dropped.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(idx) = self.index(x, y) else {
            return;
        };

        if cell.width() == 2 {
            if x + 1 < self.width {
                self.cells[idx] = cell;
                self.cells[idx + 1] = Cell::continuation(cell.style);
            } else {
                self.cells[idx] = Cell::styled(' ', cell.style);
            }
        } else {
            self.cells[idx] = cell;
        }
    }

    /// The cells of a single row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> &[Cell] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Raw access to the cell slice, for diffing.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Whether two buffers hold identical content.
    #[must_use]
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CONTINUATION;
    use crate::style::{Color, Style};

    #[test]
    fn creation_fills_with_empty_cells() {
        let buf = Buffer::new(8, 3);
        assert_eq!(buf.width(), 8);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.cells().len(), 24);
        assert!(buf.cells().iter().all(Cell::is_empty));
    }

    #[test]
    #[should_panic(expected = "width must be > 0")]
    fn zero_width_panics() {
        Buffer::new(0, 3);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut buf = Buffer::new(10, 10);
        buf.set_cell(5, 5, Cell::from_char('X'));
        assert_eq!(buf.get_cell(5, 5).map(|c| c.symbol), Some('X'));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut buf = Buffer::new(4, 4);
        buf.set_cell(4, 0, Cell::from_char('X'));
        buf.set_cell(0, 4, Cell::from_char('X'));
        buf.set_cell(100, 100, Cell::from_char('X'));
        assert!(buf.cells().iter().all(Cell::is_empty));
    }

    #[test]
    fn out_of_bounds_get_is_none() {
        let buf = Buffer::new(4, 4);
        assert!(buf.get_cell(4, 0).is_none());
        assert!(buf.get_cell(0, 4).is_none());
    }

    #[test]
    fn wide_glyph_writes_continuation() {
        let style = Style::new().fg(Color::Green);
        let mut buf = Buffer::new(10, 2);
        buf.set_cell(3, 1, Cell::styled('中', style));

        assert_eq!(buf.get_cell(3, 1).map(|c| c.symbol), Some('中'));
        let cont = buf.get_cell(4, 1).copied().expect("in bounds");
        assert_eq!(cont.symbol, CONTINUATION);
        assert!(cont.is_continuation());
        assert_eq!(cont.style, style);
    }

    #[test]
    fn wide_glyph_at_right_edge_becomes_space() {
        let mut buf = Buffer::new(5, 1);
        buf.set_cell(4, 0, Cell::from_char('中'));
        assert_eq!(buf.get_cell(4, 0).map(|c| c.symbol), Some(' '));
    }

    #[test]
    fn emoji_writes_continuation_too() {
        let mut buf = Buffer::new(5, 1);
        buf.set_cell(0, 0, Cell::from_char('✨'));
        assert_eq!(buf.get_cell(0, 0).map(|c| c.symbol), Some('✨'));
        assert!(buf.get_cell(1, 0).is_some_and(Cell::is_continuation));
    }

    #[test]
    fn row_slices_the_right_cells() {
        let mut buf = Buffer::new(5, 3);
        buf.set_cell(2, 1, Cell::from_char('R'));
        let row = buf.row(1);
        assert_eq!(row.len(), 5);
        assert_eq!(row[2].symbol, 'R');
    }

    #[test]
    fn clear_resets_content() {
        let mut buf = Buffer::new(5, 5);
        buf.set_cell(1, 1, Cell::from_char('X'));
        buf.clear();
        assert!(buf.cells().iter().all(Cell::is_empty));
    }

    #[test]
    fn content_eq_detects_changes() {
        let mut a = Buffer::new(5, 5);
        let b = Buffer::new(5, 5);
        assert!(a.content_eq(&b));
        a.set_cell(0, 0, Cell::from_char('X'));
        assert!(!a.content_eq(&b));
        assert!(!a.content_eq(&Buffer::new(5, 4)));
    }

    mod property {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wide_writes_always_pair_or_clip(
                width in 2u16..40,
                x in 0u16..40,
                y in 0u16..4,
            ) {
                let mut buf = Buffer::new(width, 4);
                buf.set_cell(x, y, Cell::from_char('中'));

                if x + 1 < width {
                    prop_assert_eq!(buf.get_cell(x, y).map(|c| c.symbol), Some('中'));
                    prop_assert!(buf.get_cell(x + 1, y).is_some_and(Cell::is_continuation));
                } else if x < width {
                    prop_assert_eq!(buf.get_cell(x, y).map(|c| c.symbol), Some(' '));
                } else {
                    prop_assert!(buf.cells().iter().all(Cell::is_empty));
                }
            }

            #[test]
            fn dimensions_survive_writes(
                width in 1u16..30,
                height in 1u16..30,
                writes in proptest::collection::vec((0u16..40, 0u16..40), 0..32),
            ) {
                let mut buf = Buffer::new(width, height);
                for (x, y) in writes {
                    buf.set_cell(x, y, Cell::from_char('z'));
                }
                prop_assert_eq!(buf.width(), width);
                prop_assert_eq!(buf.height(), height);
                prop_assert_eq!(buf.cells().len(), width as usize * height as usize);
            }
        }
    }
}
