#![forbid(unsafe_code)]

//! Fixed-size box.

use std::any::Any;

use weft_core::geometry::{Constraints, Offset, Size};
use weft_tree::{Component, Instance, LayoutContext, PaintContext, RenderObject};

/// Forces its child (or itself) to a fixed width and/or height, within the
/// incoming constraints.
#[derive(Debug, Clone)]
pub struct SizedBox {
    width: Option<f32>,
    height: Option<f32>,
    child: Option<Box<dyn Component>>,
}

impl SizedBox {
    /// A box with both dimensions fixed.
    #[must_use]
    pub fn new(width: f32, height: f32, child: Box<dyn Component>) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            child: Some(child),
        }
    }

    /// An empty spacer.
    #[must_use]
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            child: None,
        }
    }

    /// Fix only the width.
    #[must_use]
    pub fn width(width: f32, child: Box<dyn Component>) -> Self {
        Self {
            width: Some(width),
            height: None,
            child: Some(child),
        }
    }

    /// Fix only the height.
    #[must_use]
    pub fn height(height: f32, child: Box<dyn Component>) -> Self {
        Self {
            width: None,
            height: Some(height),
            child: Some(child),
        }
    }
}

impl Component for SizedBox {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(RenderSizedBox {
            width: self.width,
            height: self.height,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(sized) = object.as_any_mut().downcast_mut::<RenderSizedBox>() {
            sized.width = self.width;
            sized.height = self.height;
        }
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        self.child.iter().cloned().collect()
    }
}

#[derive(Debug)]
struct RenderSizedBox {
    width: Option<f32>,
    height: Option<f32>,
}

impl RenderSizedBox {
    /// Tighten the incoming constraints to the fixed dimensions.
    fn tighten(&self, constraints: Constraints) -> Constraints {
        let (min_width, max_width) = match self.width {
            Some(width) => {
                let clamped = width.clamp(constraints.min_width, constraints.max_width);
                (clamped, clamped)
            }
            None => (constraints.min_width, constraints.max_width),
        };
        let (min_height, max_height) = match self.height {
            Some(height) => {
                let clamped = height.clamp(constraints.min_height, constraints.max_height);
                (clamped, clamped)
            }
            None => (constraints.min_height, constraints.max_height),
        };
        Constraints {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }
}

impl RenderObject for RenderSizedBox {
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        let tightened = self.tighten(constraints);
        if cx.child_count() == 0 {
            return tightened.constrain(Size::new(
                self.width.unwrap_or(0.0),
                self.height.unwrap_or(0.0),
            ));
        }
        let size = cx.layout_child(0, tightened, true);
        cx.position_child(0, Offset::ZERO);
        size
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
        "RenderSizedBox"
    }
}
