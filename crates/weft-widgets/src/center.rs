#![forbid(unsafe_code)]

//! Centering wrapper.

use std::any::Any;

use weft_core::geometry::{Constraints, Offset, Size};
use weft_tree::{Component, Instance, LayoutContext, PaintContext, RenderObject};

/// Centers a single child within the available space.
///
/// The child lays out at its natural size under loosened constraints; the
/// box itself expands to the bounded maxima. The centering offset floors,
/// so a 12-cell child in a 45-cell box lands at column 16.
#[derive(Debug, Clone)]
pub struct Center {
    child: Box<dyn Component>,
}

impl Center {
    /// Center `child`.
    #[must_use]
    pub fn new(child: Box<dyn Component>) -> Self {
        Self { child }
    }
}

impl Component for Center {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(RenderCenter))
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        vec![self.child.clone()]
    }
}

#[derive(Debug)]
struct RenderCenter;

impl RenderObject for RenderCenter {
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        if cx.child_count() == 0 {
            return constraints.constrain(constraints.biggest());
        }

        let child = cx.layout_child(0, constraints.loosen(), true);
        let width = if constraints.has_bounded_width() {
            constraints.max_width
        } else {
            child.width
        };
        let height = if constraints.has_bounded_height() {
            constraints.max_height
        } else {
            child.height
        };
        let size = constraints.constrain(Size::new(width, height));

        cx.position_child(
            0,
            Offset::new(
                ((size.width - child.width) / 2.0).floor(),
                ((size.height - child.height) / 2.0).floor(),
            ),
        );
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
        "RenderCenter"
    }
}
