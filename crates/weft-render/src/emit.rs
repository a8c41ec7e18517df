#![forbid(unsafe_code)]

//! Frame emission: buffer → terminal bytes.
//!
//! Serializes a [`Buffer`] to ANSI output in row-major order:
//!
//! 1. Move the cursor home.
//! 2. For each cell, skip continuation markers (the terminal advances two
//!    columns for the double-width glyph that precedes them); bracket
//!    non-default styles with the SGR prefix and the SGR reset; emit the
//!    character.
//! 3. Separate rows with CRLF — the terminal is in raw mode, so output
//!    post-processing is off and a bare LF would not return the carriage.
//!    No separator follows the last row.
//!
//! Every non-continuation character of the buffer appears in the output in
//! row-major order, which is what the round-trip tests assert.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::Buffer;

/// Serialize `buffer` to `w` and flush.
pub fn emit_frame<W: Write>(w: &mut W, buffer: &Buffer) -> io::Result<()> {
    ansi::cup(w, 0, 0)?;

    let mut utf8 = [0u8; 4];
    for y in 0..buffer.height() {
        if y > 0 {
            w.write_all(b"\r\n")?;
        }
        for cell in buffer.row(y) {
            if cell.is_continuation() {
                continue;
            }
            if cell.style.is_default() {
                w.write_all(cell.symbol.encode_utf8(&mut utf8).as_bytes())?;
            } else {
                ansi::sgr_style(w, &cell.style)?;
                w.write_all(cell.symbol.encode_utf8(&mut utf8).as_bytes())?;
                ansi::sgr_reset(w)?;
            }
        }
    }

    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::cell::Cell;
    use crate::style::{Color, Style};

    fn emit(buffer: &Buffer) -> String {
        let mut out = Vec::new();
        emit_frame(&mut out, buffer).expect("write to vec");
        String::from_utf8(out).expect("valid utf-8")
    }

    /// Strip CSI sequences, leaving only the printed characters.
    fn printed(output: &str) -> String {
        let mut chars = output.chars().peekable();
        let mut result = String::new();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // CSI: skip until the final byte (0x40-0x7E).
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for f in chars.by_ref() {
                        if ('\u{40}'..='\u{7E}').contains(&f) {
                            break;
                        }
                    }
                }
                continue;
            }
            result.push(c);
        }
        result
    }

    #[test]
    fn starts_with_cursor_home() {
        let buf = Buffer::new(2, 1);
        assert!(emit(&buf).starts_with("\x1b[1;1H"));
    }

    #[test]
    fn rows_are_separated_not_terminated() {
        let buf = Buffer::new(2, 3);
        let out = emit(&buf);
        assert_eq!(out.matches("\r\n").count(), 2);
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn plain_cells_emit_bare_characters() {
        let mut buf = Buffer::new(3, 1);
        buf.set_cell(0, 0, Cell::from_char('h'));
        buf.set_cell(1, 0, Cell::from_char('i'));
        assert_eq!(printed(&emit(&buf)), "hi ");
    }

    #[test]
    fn styled_cells_are_bracketed_with_sgr() {
        let mut buf = Buffer::new(2, 1);
        buf.set_cell(0, 0, Cell::styled('x', Style::new().fg(Color::Red)));
        let out = emit(&buf);
        assert!(out.contains("\x1b[31mx\x1b[0m"), "got: {out:?}");
    }

    #[test]
    fn continuation_markers_are_skipped() {
        let mut buf = Buffer::new(4, 1);
        buf.set_cell(0, 0, Cell::from_char('中'));
        buf.set_cell(2, 0, Cell::from_char('a'));
        let out = emit(&buf);
        assert!(!out.contains('\u{200B}'));
        assert_eq!(printed(&out), "中a ");
    }

    #[test]
    fn preserves_characters_in_row_major_order() {
        let mut buf = Buffer::new(3, 2);
        {
            let mut canvas = Canvas::new(&mut buf);
            canvas.draw_text(0, 0, "ab", Style::new());
            canvas.draw_text(0, 1, "cd", Style::new());
        }
        assert_eq!(printed(&emit(&buf)), "ab \r\ncd ");
    }

    #[test]
    fn wide_glyph_rows_keep_column_budget() {
        // 5 columns holding "✨" + "abc": emitter outputs 4 visible symbols
        // whose widths sum to the row width.
        let mut buf = Buffer::new(5, 1);
        Canvas::new(&mut buf).draw_text(0, 0, "✨abc", Style::new());
        let row = printed(&emit(&buf));
        assert_eq!(row, "✨abc");
        assert_eq!(weft_core::width::string_width(&row), 5);
    }
}
