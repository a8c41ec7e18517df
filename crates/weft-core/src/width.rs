#![forbid(unsafe_code)]

//! Terminal display width.
//!
//! Maps a codepoint to the number of terminal columns it occupies (0, 1 or 2)
//! and sums widths over strings. The East-Asian Wide/Fullwidth classes come
//! from the `unicode-width` tables; zero-width classes and emoji presentation
//! are layered on top because terminals render emoji double-width regardless
//! of what the East-Asian Width property says.
//!
//! Strings are measured codepoint by codepoint: a ZWJ-joined sequence counts
//! as the sum of its visible parts, not as one grapheme cluster.

use unicode_width::UnicodeWidthChar;

/// Codepoints that occupy no columns: combining marks, joiners, variation
/// selectors, and invisible format controls.
#[inline]
fn is_zero_width(c: char) -> bool {
    let u = c as u32;
    matches!(u, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF)
        || matches!(u, 0x200B..=0x200F)
        || matches!(u, 0xFE00..=0xFE0F | 0xFE20..=0xFE2F | 0xE0100..=0xE01EF)
        || matches!(u, 0x00AD | 0x034F | 0x180E | 0x2060 | 0xFEFF)
        || matches!(u, 0x202A..=0x202E | 0x2066..=0x2069)
}

/// Codepoints terminals render as double-width emoji even when the Unicode
/// width tables call them narrow or ambiguous.
#[inline]
fn is_emoji(c: char) -> bool {
    let u = c as u32;
    matches!(u, 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0x1F000..=0x1FFFF)
}

/// Display width of a single codepoint: 0, 1 or 2.
///
/// Control characters below `0x20` (including TAB) report width 1; tab
/// expansion is the caller's concern, not a property of the codepoint.
#[must_use]
pub fn rune_width(c: char) -> usize {
    if (c as u32) < 0x20 {
        return 1;
    }
    if c.is_ascii() {
        // 0x20..=0x7E plus DEL; DEL never reaches a cell.
        return usize::from(c != '\u{7F}');
    }
    if is_zero_width(c) {
        return 0;
    }
    if is_emoji(c) {
        return 2;
    }
    match UnicodeWidthChar::width(c) {
        Some(w) if w >= 2 => 2,
        Some(0) => 0,
        _ => 1,
    }
}

/// Display width of a string: the sum of [`rune_width`] over its codepoints.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(rune_width).sum()
}

#[cfg(test)]
mod tests {
    use super::{rune_width, string_width};

    #[test]
    fn printable_ascii_is_width_one() {
        for b in 0x20u8..=0x7E {
            assert_eq!(rune_width(b as char), 1, "U+{:04X}", b as u32);
        }
    }

    #[test]
    fn control_chars_are_width_one() {
        for b in 0u8..0x20 {
            assert_eq!(rune_width(b as char), 1, "U+{:04X}", b as u32);
        }
    }

    #[test]
    fn tab_is_width_one() {
        assert_eq!(rune_width('\t'), 1);
    }

    #[test]
    fn joiners_and_selectors_are_zero_width() {
        assert_eq!(rune_width('\u{200D}'), 0); // ZWJ
        assert_eq!(rune_width('\u{200B}'), 0); // ZWSP
        assert_eq!(rune_width('\u{FE0F}'), 0); // variation selector 16
        assert_eq!(rune_width('\u{0301}'), 0); // combining acute
    }

    #[test]
    fn emoji_are_double_width() {
        for c in ['✨', '⭐', '💫', '🌟', '☀', '☁', '🚀', '💻', '🎯', '🔥'] {
            assert_eq!(rune_width(c), 2, "{c:?}");
        }
    }

    #[test]
    fn cjk_and_hangul_are_double_width() {
        for c in ['中', '日', '한', '文'] {
            assert_eq!(rune_width(c), 2, "{c:?}");
        }
    }

    #[test]
    fn bullet_is_width_one() {
        assert_eq!(rune_width('\u{2022}'), 1);
    }

    #[test]
    fn string_width_is_sum_of_codepoints() {
        let samples = ["", "abc", "日本語", "a✨b", "e\u{0301}", "👨\u{200D}👩"];
        for s in &samples {
            assert_eq!(string_width(s), s.chars().map(rune_width).sum::<usize>());
        }
    }

    #[test]
    fn plain_text_measures_by_length() {
        assert_eq!(string_width("Hello World"), 11);
    }

    #[test]
    fn emoji_prefix_measures_wide() {
        assert_eq!(string_width("✨ Features:"), 12);
    }

    #[test]
    fn embedded_emoji_measures_wide() {
        assert_eq!(string_width("Hello 🌍 World"), 14);
    }

    #[test]
    fn mixed_emoji_sentence_measures_wide() {
        assert_eq!(string_width("Code 💻 + Coffee ☕ = 🎯"), 24);
    }

    #[test]
    fn zwj_family_is_at_least_two() {
        // Measured as the sum of its parts, never collapsed to one cluster.
        assert!(string_width("👨\u{200D}👩\u{200D}👧") >= 2);
    }
}
