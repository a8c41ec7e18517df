#![forbid(unsafe_code)]

//! Flex containers: [`Row`] and [`Column`].
//!
//! Children are laid out along the main axis at their natural size and
//! positioned according to the main- and cross-axis alignments. Centering
//! uses display-width-derived sizes and floors the division, so a 3-cell
//! child in a 50-cell cross axis starts at column 23.

use std::any::Any;

use weft_core::geometry::{Constraints, Offset, Size};
use weft_tree::{Component, Instance, Key, LayoutContext, PaintContext, RenderObject};

/// The axis children are laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Placement of children along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainAxisAlignment {
    /// Pack children at the start.
    #[default]
    Start,
    /// Center the run of children.
    Center,
    /// Pack children at the end.
    End,
}

/// Placement of each child across the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossAxisAlignment {
    /// Align children to the start edge.
    #[default]
    Start,
    /// Center each child.
    Center,
    /// Align children to the end edge.
    End,
    /// Force children to fill the cross axis.
    Stretch,
}

/// A horizontal run of children.
#[derive(Debug, Clone)]
pub struct Row {
    key: Option<Key>,
    main_axis_alignment: MainAxisAlignment,
    cross_axis_alignment: CrossAxisAlignment,
    children: Vec<Box<dyn Component>>,
}

impl Row {
    /// Create a row.
    #[must_use]
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self {
            key: None,
            main_axis_alignment: MainAxisAlignment::Start,
            cross_axis_alignment: CrossAxisAlignment::Start,
            children,
        }
    }

    /// Set the reconciliation key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the main-axis alignment.
    #[must_use]
    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    /// Set the cross-axis alignment.
    #[must_use]
    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }
}

impl Component for Row {
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
        Instance::Render(Box::new(RenderFlex {
            axis: Axis::Horizontal,
            main_axis_alignment: self.main_axis_alignment,
            cross_axis_alignment: self.cross_axis_alignment,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(flex) = object.as_any_mut().downcast_mut::<RenderFlex>() {
            flex.axis = Axis::Horizontal;
            flex.main_axis_alignment = self.main_axis_alignment;
            flex.cross_axis_alignment = self.cross_axis_alignment;
        }
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        self.children.clone()
    }
}

/// A vertical run of children.
#[derive(Debug, Clone)]
pub struct Column {
    key: Option<Key>,
    main_axis_alignment: MainAxisAlignment,
    cross_axis_alignment: CrossAxisAlignment,
    children: Vec<Box<dyn Component>>,
}

impl Column {
    /// Create a column.
    #[must_use]
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self {
            key: None,
            main_axis_alignment: MainAxisAlignment::Start,
            cross_axis_alignment: CrossAxisAlignment::Start,
            children,
        }
    }

    /// Set the reconciliation key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the main-axis alignment.
    #[must_use]
    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    /// Set the cross-axis alignment.
    #[must_use]
    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }
}

impl Component for Column {
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
        Instance::Render(Box::new(RenderFlex {
            axis: Axis::Vertical,
            main_axis_alignment: self.main_axis_alignment,
            cross_axis_alignment: self.cross_axis_alignment,
        }))
    }

    fn update_render_object(&self, object: &mut dyn RenderObject) {
        if let Some(flex) = object.as_any_mut().downcast_mut::<RenderFlex>() {
            flex.axis = Axis::Vertical;
            flex.main_axis_alignment = self.main_axis_alignment;
            flex.cross_axis_alignment = self.cross_axis_alignment;
        }
    }

    fn children(&self) -> Vec<Box<dyn Component>> {
        self.children.clone()
    }
}

/// Shared layout for both flex directions.
#[derive(Debug)]
struct RenderFlex {
    axis: Axis,
    main_axis_alignment: MainAxisAlignment,
    cross_axis_alignment: CrossAxisAlignment,
}

impl RenderFlex {
    fn main_of(&self, size: Size) -> f32 {
        match self.axis {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    fn cross_of(&self, size: Size) -> f32 {
        match self.axis {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    fn pack(&self, main: f32, cross: f32) -> Size {
        match self.axis {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    fn offset(&self, main: f32, cross: f32) -> Offset {
        match self.axis {
            Axis::Horizontal => Offset::new(main, cross),
            Axis::Vertical => Offset::new(cross, main),
        }
    }

    fn child_constraints(&self, constraints: Constraints) -> Constraints {
        let max_cross = self.cross_of(constraints.biggest());
        let stretch = self.cross_axis_alignment == CrossAxisAlignment::Stretch
            && max_cross.is_finite();
        let (min_cross, max_cross) = if stretch {
            (max_cross, max_cross)
        } else {
            (
                0.0,
                match self.axis {
                    Axis::Horizontal => constraints.max_height,
                    Axis::Vertical => constraints.max_width,
                },
            )
        };

        match self.axis {
            Axis::Horizontal => Constraints {
                min_width: 0.0,
                max_width: f32::INFINITY,
                min_height: min_cross,
                max_height: max_cross,
            },
            Axis::Vertical => Constraints {
                min_width: min_cross,
                max_width: max_cross,
                min_height: 0.0,
                max_height: f32::INFINITY,
            },
        }
    }
}

impl RenderObject for RenderFlex {
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        let child_constraints = self.child_constraints(constraints);

        let mut used_main = 0.0f32;
        let mut max_cross = 0.0f32;
        let mut child_sizes = Vec::with_capacity(cx.child_count());
        for index in 0..cx.child_count() {
            let child = cx.layout_child(index, child_constraints, true);
            used_main += self.main_of(child);
            max_cross = max_cross.max(self.cross_of(child));
            child_sizes.push(child);
        }

        let max_main = self.main_of(constraints.biggest());
        let main_extent = if max_main.is_finite() {
            max_main.max(used_main)
        } else {
            used_main
        };
        let size = constraints.constrain(self.pack(main_extent, max_cross));
        let main_extent = self.main_of(size);
        let cross_extent = self.cross_of(size);

        let free = (main_extent - used_main).max(0.0);
        let mut cursor = match self.main_axis_alignment {
            MainAxisAlignment::Start => 0.0,
            MainAxisAlignment::Center => (free / 2.0).floor(),
            MainAxisAlignment::End => free,
        };

        for (index, child) in child_sizes.iter().enumerate() {
            let cross = match self.cross_axis_alignment {
                CrossAxisAlignment::Start | CrossAxisAlignment::Stretch => 0.0,
                CrossAxisAlignment::Center => {
                    ((cross_extent - self.cross_of(*child)) / 2.0).floor()
                }
                CrossAxisAlignment::End => cross_extent - self.cross_of(*child),
            };
            cx.position_child(index, self.offset(cursor, cross));
            cursor += self.main_of(*child);
        }

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
        "RenderFlex"
    }
}
