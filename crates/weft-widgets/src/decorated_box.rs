#![forbid(unsafe_code)]

//! Background and border decoration.

use std::any::Any;

use weft_core::geometry::{Constraints, EdgeInsets, Offset, Rect, Size};
use weft_render::style::Style;
use weft_tree::{Component, Instance, LayoutContext, PaintContext, RenderObject};

/// Paints an optional background fill and an optional single-line border
/// behind its child. A border insets the child by one cell on every side
/// so content never overwrites the frame.
#[derive(Debug, Clone)]
pub struct DecoratedBox {
    background: Option<Style>,
    border: Option<Style>,
    child: Box<dyn Component>,
}

impl DecoratedBox {
    /// Decorate `child`; add decoration with the builder methods.
    #[must_use]
    pub fn new(child: Box<dyn Component>) -> Self {
        Self {
            background: None,
            border: None,
            child,
        }
    }

    /// Fill the box with styled spaces.
    #[must_use]
    pub fn background(mut self, style: Style) -> Self {
        self.background = Some(style);
        self
    }

    /// Draw a single-line box border.
    #[must_use]
    pub fn border(mut self, style: Style) -> Self {
        self.border = Some(style);
        self
    }
}

impl Component for DecoratedBox {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(RenderDecoratedBox {
            background: self.background,
            border: self.border,
            size: Size::ZERO,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(decorated) = object.as_any_mut().downcast_mut::<RenderDecoratedBox>() {
            decorated.background = self.background;
            decorated.border = self.border;
        }
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        vec![self.child.clone()]
    }
}

#[derive(Debug)]
struct RenderDecoratedBox {
    background: Option<Style>,
    border: Option<Style>,
    /// Laid-out size, kept for painting the decoration.
    size: Size,
}

impl RenderDecoratedBox {
    fn content_insets(&self) -> EdgeInsets {
        if self.border.is_some() {
            EdgeInsets::all(1.0)
        } else {
            EdgeInsets::ZERO
        }
    }
}

impl RenderObject for RenderDecoratedBox {
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        let insets = self.content_insets();
        let size = if cx.child_count() == 0 {
            constraints.constrain(Size::new(insets.horizontal(), insets.vertical()))
        } else {
            let child = cx.layout_child(0, constraints.deflate(insets), true);
            cx.position_child(0, insets.top_left());
            constraints.constrain(Size::new(
                child.width + insets.horizontal(),
                child.height + insets.vertical(),
            ))
        };
        self.size = size;
        size
    }

    fn paint(&self, cx: &mut PaintContext<'_, '_>, offset: Offset) {
        let (x, y) = offset.to_cell();
        let (width, height) = self.size.to_cell();
        let rect = Rect::new(x, y, width, height);

        if let Some(background) = self.background {
            cx.canvas().draw_rect(rect, background);
        }
        if let Some(border) = self.border {
            cx.canvas().draw_border(rect, border);
        }
        cx.paint_children(offset);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "RenderDecoratedBox"
    }
}
