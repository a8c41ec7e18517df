#![forbid(unsafe_code)]

//! Padding wrapper.

use std::any::Any;

use weft_core::geometry::{Constraints, EdgeInsets, Offset, Size};
use weft_tree::{Component, Instance, LayoutContext, PaintContext, RenderObject};

/// Insets a single child.
#[derive(Debug, Clone)]
pub struct Padding {
    insets: EdgeInsets,
    child: Box<dyn Component>,
}

impl Padding {
    /// Pad `child` by `insets`.
    #[must_use]
    pub fn new(insets: EdgeInsets, child: Box<dyn Component>) -> Self {
        Self { insets, child }
    }

    /// Pad `child` uniformly.
    #[must_use]
    pub fn all(value: f32, child: Box<dyn Component>) -> Self {
        Self::new(EdgeInsets::all(value), child)
    }
}

impl Component for Padding {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(RenderPadding {
            insets: self.insets,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(padding) = object.as_any_mut().downcast_mut::<RenderPadding>() {
            padding.insets = self.insets;
        }
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        vec![self.child.clone()]
    }
}

#[derive(Debug)]
struct RenderPadding {
    insets: EdgeInsets,
}

impl RenderObject for RenderPadding {
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        if cx.child_count() == 0 {
            return constraints.constrain(Size::new(
                self.insets.horizontal(),
                self.insets.vertical(),
            ));
        }
        let child = cx.layout_child(0, constraints.deflate(self.insets), true);
        cx.position_child(0, self.insets.top_left());
        constraints.constrain(Size::new(
            child.width + self.insets.horizontal(),
            child.height + self.insets.vertical(),
        ))
    }

    fn paint(&self, cx: &mut PaintContext<'_, '_>, offset: Offset) {
        cx.paint_children(offset);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "RenderPadding"
    }
}
