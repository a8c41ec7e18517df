#![forbid(unsafe_code)]

//! ANSI escape sequence generation.
//!
//! Pure byte-generation helpers for the control sequences the emitter
//! needs. No state tracking here; the emitter decides when a sequence is
//! required.
//!
//! | Purpose | Sequence |
//! |---------|----------|
//! | SGR style | `CSI <params> m`, reset `CSI 0 m` |
//! | Cursor position | `CSI row+1 ; col+1 H` (1-indexed) |
//! | True color fg/bg | `38;2;r;g;b` / `48;2;r;g;b` |
//! | 256-color fg/bg | `38;5;n` / `48;5;n` |
//! | 16-color fg/bg | `30-37` / `90-97` and `40-47` / `100-107` |

use std::io::{self, Write};

use crate::style::{Color, FontWeight, Style};

/// SGR reset: `CSI 0 m`.
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Write the SGR reset sequence.
#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// CUP (cursor position), 0-indexed input converted to the 1-indexed wire
/// form `CSI row+1 ; col+1 H`.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", row + 1, col + 1)
}

/// Append the SGR parameter(s) selecting `color` as foreground or
/// background to `params`.
fn push_color_params(params: &mut Vec<u8>, color: Color, background: bool) {
    let mut push = |s: String| {
        if !params.is_empty() {
            params.push(b';');
        }
        params.extend_from_slice(s.as_bytes());
    };

    match color {
        Color::Rgb(r, g, b) => {
            let base = if background { 48 } else { 38 };
            push(format!("{base};2;{r};{g};{b}"));
        }
        Color::Indexed(n) => {
            let base = if background { 48 } else { 38 };
            push(format!("{base};5;{n}"));
        }
        named => {
            // ansi_index is Some for every named variant.
            let index = named.ansi_index().unwrap_or(7);
            let code = match (index < 8, background) {
                (true, false) => 30 + index,
                (true, true) => 40 + index,
                (false, false) => 90 + index - 8,
                (false, true) => 100 + index - 8,
            };
            push(format!("{code}"));
        }
    }
}

/// Write the SGR sequence selecting `style`.
///
/// Emits nothing for the default style; the caller brackets styled cells
/// with [`sgr_reset`].
pub fn sgr_style<W: Write>(w: &mut W, style: &Style) -> io::Result<()> {
    if style.is_default() {
        return Ok(());
    }

    let mut params: Vec<u8> = Vec::with_capacity(16);
    let mut push_code = |params: &mut Vec<u8>, code: u8| {
        if !params.is_empty() {
            params.push(b';');
        }
        params.extend_from_slice(code.to_string().as_bytes());
    };

    match style.weight {
        FontWeight::Normal => {}
        FontWeight::Bold => push_code(&mut params, 1),
        FontWeight::Dim => push_code(&mut params, 2),
    }
    if style.italic {
        push_code(&mut params, 3);
    }
    if style.underline {
        push_code(&mut params, 4);
    }
    if style.reverse {
        push_code(&mut params, 7);
    }
    if let Some(fg) = style.fg {
        push_color_params(&mut params, fg, false);
    }
    if let Some(bg) = style.bg {
        push_color_params(&mut params, bg, true);
    }

    w.write_all(b"\x1b[")?;
    w.write_all(&params)?;
    w.write_all(b"m")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(style: &Style) -> String {
        let mut out = Vec::new();
        sgr_style(&mut out, style).expect("write to vec");
        String::from_utf8(out).expect("ascii")
    }

    #[test]
    fn default_style_emits_nothing() {
        assert_eq!(styled(&Style::new()), "");
    }

    #[test]
    fn attribute_codes() {
        assert_eq!(styled(&Style::new().bold()), "\x1b[1m");
        assert_eq!(styled(&Style::new().dim()), "\x1b[2m");
        assert_eq!(styled(&Style::new().italic()), "\x1b[3m");
        assert_eq!(styled(&Style::new().underline()), "\x1b[4m");
        assert_eq!(styled(&Style::new().reverse()), "\x1b[7m");
    }

    #[test]
    fn named_colors() {
        assert_eq!(styled(&Style::new().fg(Color::Red)), "\x1b[31m");
        assert_eq!(styled(&Style::new().bg(Color::Blue)), "\x1b[44m");
        assert_eq!(styled(&Style::new().fg(Color::BrightCyan)), "\x1b[96m");
        assert_eq!(styled(&Style::new().bg(Color::BrightWhite)), "\x1b[107m");
    }

    #[test]
    fn extended_colors() {
        assert_eq!(styled(&Style::new().fg(Color::Indexed(42))), "\x1b[38;5;42m");
        assert_eq!(
            styled(&Style::new().bg(Color::Rgb(1, 2, 3))),
            "\x1b[48;2;1;2;3m"
        );
    }

    #[test]
    fn combined_attributes_join_with_semicolons() {
        let style = Style::new().bold().underline().fg(Color::Green).bg(Color::Black);
        assert_eq!(styled(&style), "\x1b[1;4;32;40m");
    }

    #[test]
    fn cursor_position_is_one_indexed() {
        let mut out = Vec::new();
        cup(&mut out, 0, 0).expect("write");
        assert_eq!(out, b"\x1b[1;1H");

        out.clear();
        cup(&mut out, 4, 9).expect("write");
        assert_eq!(out, b"\x1b[5;10H");
    }

    #[test]
    fn reset_sequence() {
        assert_eq!(SGR_RESET, b"\x1b[0m");
    }
}
