#![forbid(unsafe_code)]

//! Text widget.
//!
//! Measures with display widths, so emoji and CJK glyphs take two columns
//! and alignment math stays correct. Newlines split the content into rows.

use std::any::Any;

use weft_core::geometry::{Constraints, Offset, Size};
use weft_core::width::string_width;
use weft_render::style::Style;
use weft_tree::{Component, Instance, Key, LayoutContext, PaintContext, RenderObject};

/// A run of styled text.
#[derive(Debug, Clone)]
pub struct Text {
    key: Option<Key>,
    content: String,
    style: Style,
}

impl Text {
    /// Create unstyled text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            key: None,
            content: content.into(),
            style: Style::new(),
        }
    }

    /// Set the style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the reconciliation key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }
}

impl Component for Text {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(RenderText {
            content: self.content.clone(),
            style: self.style,
            size: Size::ZERO,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(text) = object.as_any_mut().downcast_mut::<RenderText>() {
            text.content = self.content.clone();
            text.style = self.style;
        }
    }
}

/// Truncate a line to at most `max_width` display columns.
fn truncate_to_width(line: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (byte_index, ch) in line.char_indices() {
        let width = weft_core::width::rune_width(ch);
        if used + width > max_width {
            return &line[..byte_index];
        }
        used += width;
    }
    line
}

#[derive(Debug)]
struct RenderText {
    content: String,
    style: Style,
    /// Laid-out size; painting clips to it.
    size: Size,
}

impl RenderObject for RenderText {
    fn layout(&mut self, _cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        let width = self
            .content
            .lines()
            .map(string_width)
            .max()
            .unwrap_or(0);
        let height = self.content.lines().count().max(1);
        self.size = constraints.constrain(Size::new(width as f32, height as f32));
        self.size
    }

    fn paint(&self, cx: &mut PaintContext<'_, '_>, offset: Offset) {
        let (x, y) = offset.to_cell();
        let (max_width, max_height) = self.size.to_cell();
        for (line_index, line) in self.content.lines().take(max_height as usize).enumerate() {
            let visible = truncate_to_width(line, max_width as usize);
            cx.canvas()
                .draw_text(x, y + line_index as u16, visible, self.style);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "RenderText"
    }
}
