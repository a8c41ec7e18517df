#![forbid(unsafe_code)]

//! The layout/paint protocol.
//!
//! A render object is a node that knows how to size itself under
//! constraints and draw itself onto a canvas. Objects are stored in a
//! [`RenderTree`](crate::render_tree::RenderTree) arena; during layout and
//! paint they operate through contexts that expose their children by index,
//! so no node ever holds a direct reference into the tree.
//!
//! # Layout contract
//!
//! `layout` returns a size satisfying its constraints. Before returning,
//! the object must lay out each child (via
//! [`LayoutContext::layout_child`](crate::render_tree::LayoutContext::layout_child))
//! and place it
//! ([`LayoutContext::position_child`](crate::render_tree::LayoutContext::position_child)).
//! A size outside the constraints is a programming error: it is reported to
//! the error sink, clamped, and the frame continues.
//!
//! # Paint contract
//!
//! `paint` draws at `offset` and paints each child at `offset + child
//! offset`, in child order —
//! [`PaintContext::paint_children`](crate::render_tree::PaintContext::paint_children)
//! does exactly that.

use std::any::Any;

use weft_core::geometry::{Constraints, Offset, Size};

use crate::render_tree::{LayoutContext, PaintContext};

/// A node in the layout/paint tree.
pub trait RenderObject {
    /// Compute a size under `constraints`, laying out and placing children.
    fn layout(&mut self, cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size;

    /// Draw at `offset`, painting children in order.
    fn paint(&self, cx: &mut PaintContext<'_, '_>, offset: Offset);

    /// Downcast access for property sync from components.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast access for property sync from components.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name used in error reports.
    fn debug_name(&self) -> &'static str {
        "render object"
    }
}
