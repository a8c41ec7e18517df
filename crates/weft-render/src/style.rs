#![forbid(unsafe_code)]

//! Cell styling: colors, weight, and text attributes.

/// A terminal color.
///
/// The sixteen named variants map onto the standard ANSI palette; `Indexed`
/// addresses the 256-color palette and `Rgb` emits 24-bit true color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// The ANSI palette index for named colors (0-15), `None` otherwise.
    #[must_use]
    pub const fn ansi_index(self) -> Option<u8> {
        match self {
            Self::Black => Some(0),
            Self::Red => Some(1),
            Self::Green => Some(2),
            Self::Yellow => Some(3),
            Self::Blue => Some(4),
            Self::Magenta => Some(5),
            Self::Cyan => Some(6),
            Self::White => Some(7),
            Self::BrightBlack => Some(8),
            Self::BrightRed => Some(9),
            Self::BrightGreen => Some(10),
            Self::BrightYellow => Some(11),
            Self::BrightBlue => Some(12),
            Self::BrightMagenta => Some(13),
            Self::BrightCyan => Some(14),
            Self::BrightWhite => Some(15),
            Self::Indexed(_) | Self::Rgb(..) => None,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Normal intensity.
    #[default]
    Normal,
    /// Bold / increased intensity.
    Bold,
    /// Dim / decreased intensity.
    Dim,
}

/// The visual style of a cell.
///
/// A value type; the default style carries no colors and no attributes and
/// is emitted without any SGR sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color, terminal default when `None`.
    pub fg: Option<Color>,
    /// Background color, terminal default when `None`.
    pub bg: Option<Color>,
    /// Font weight.
    pub weight: FontWeight,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Reverse video (swap fg/bg).
    pub reverse: bool,
}

impl Style {
    /// The default style: no colors, normal weight, no attributes.
    pub const DEFAULT: Self = Self {
        fg: None,
        bg: None,
        weight: FontWeight::Normal,
        italic: false,
        underline: false,
        reverse: false,
    };

    /// Create the default style.
    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Use bold weight.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    /// Use dim weight.
    #[must_use]
    pub const fn dim(mut self) -> Self {
        self.weight = FontWeight::Dim;
        self
    }

    /// Enable italics.
    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Enable underline.
    #[must_use]
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Enable reverse video.
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Whether this is the default style (emitted without SGR).
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, FontWeight, Style};

    #[test]
    fn default_style_has_nothing_set() {
        let style = Style::new();
        assert!(style.is_default());
        assert_eq!(style.fg, None);
        assert_eq!(style.bg, None);
        assert_eq!(style.weight, FontWeight::Normal);
    }

    #[test]
    fn builder_composes() {
        let style = Style::new().fg(Color::Red).bg(Color::Black).bold().italic();
        assert!(!style.is_default());
        assert_eq!(style.fg, Some(Color::Red));
        assert_eq!(style.bg, Some(Color::Black));
        assert_eq!(style.weight, FontWeight::Bold);
        assert!(style.italic);
        assert!(!style.underline);
    }

    #[test]
    fn named_colors_have_ansi_indices() {
        assert_eq!(Color::Black.ansi_index(), Some(0));
        assert_eq!(Color::White.ansi_index(), Some(7));
        assert_eq!(Color::BrightBlack.ansi_index(), Some(8));
        assert_eq!(Color::BrightWhite.ansi_index(), Some(15));
        assert_eq!(Color::Indexed(42).ansi_index(), None);
        assert_eq!(Color::Rgb(1, 2, 3).ansi_index(), None);
    }
}
