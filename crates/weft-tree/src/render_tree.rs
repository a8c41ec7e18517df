#![forbid(unsafe_code)]

//! Render object storage.
//!
//! Render objects live in an arena keyed by stable [`RenderId`]s, with
//! owning parent → child links and plain back-pointers for traversal —
//! never a cycle of shared ownership. The arena holds everything the
//! protocol needs around each object: its size, most recent constraints,
//! the offset its parent assigned (parent data), depth, dirty bits, the
//! relayout boundary, and the world rect recorded at paint time for hit
//! testing.
//!
//! During `layout` and `paint` the object in flight is taken out of its
//! slot so the context can hand the rest of the tree to the object without
//! aliasing.

use weft_core::geometry::{Constraints, Offset, Rect, Size};
use weft_render::canvas::Canvas;

use crate::element::ElementId;
use crate::pipeline::{FrameError, FramePhase, PipelineOwner};
use crate::render_object::RenderObject;

/// Stable handle to a node in the [`RenderTree`].
///
/// Generational: a handle is invalidated when its slot is freed, so a
/// handle can never alias a node mounted later into the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderId {
    index: u32,
    generation: u32,
}

struct RenderNode {
    /// `None` only while the object's own layout or paint is running.
    object: Option<Box<dyn RenderObject>>,
    parent: Option<RenderId>,
    children: Vec<RenderId>,
    /// Offset within the parent, assigned during the parent's layout.
    offset: Offset,
    size: Size,
    constraints: Option<Constraints>,
    parent_uses_size: bool,
    relayout_boundary: Option<RenderId>,
    needs_layout: bool,
    needs_paint: bool,
    depth: usize,
    /// Cell-space rect recorded at paint time, for hit testing.
    world_rect: Rect,
    /// The element owning this node.
    owner: Option<ElementId>,
}

struct Slot {
    generation: u32,
    node: Option<RenderNode>,
}

/// Arena of render objects plus their tree structure.
#[derive(Default)]
pub struct RenderTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<RenderId>,
}

impl RenderTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: RenderId) -> Option<&RenderNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Insert a detached node; `set_children` links it into the structure.
    pub fn insert(&mut self, object: Box<dyn RenderObject>) -> RenderId {
        let node = RenderNode {
            object: Some(object),
            parent: None,
            children: Vec::new(),
            offset: Offset::ZERO,
            size: Size::ZERO,
            constraints: None,
            parent_uses_size: false,
            relayout_boundary: None,
            needs_layout: true,
            needs_paint: true,
            depth: 0,
            world_rect: Rect::default(),
            owner: None,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            RenderId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            RenderId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Remove a node, detaching it from its parent and the dirty sets.
    pub fn remove(&mut self, id: RenderId, pipeline: &mut PipelineOwner) {
        let node = {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                return;
            };
            if slot.generation != id.generation {
                return;
            }
            let Some(node) = slot.node.take() else {
                return;
            };
            slot.generation += 1;
            node
        };

        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
        pipeline.forget(id);
        self.free.push(id.index);
    }

    /// Whether the node still exists.
    #[must_use]
    pub fn contains(&self, id: RenderId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Whether the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the root node.
    pub fn set_root(&mut self, id: Option<RenderId>) {
        self.root = id;
        if let Some(id) = id {
            self.update_depth(id, 0);
        }
    }

    /// The root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<RenderId> {
        self.root
    }

    /// Replace a node's children, re-parenting and re-depthing them.
    pub fn set_children(&mut self, parent: RenderId, children: Vec<RenderId>) {
        let Some(parent_depth) = self.node(parent).map(|n| n.depth) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children = children.clone();
        }
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(parent);
            }
            self.update_depth(child, parent_depth + 1);
        }
    }

    fn update_depth(&mut self, id: RenderId, depth: usize) {
        let children = match self.node_mut(id) {
            Some(node) => {
                node.depth = depth;
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            self.update_depth(child, depth + 1);
        }
    }

    /// A node's depth (0 at the root).
    #[must_use]
    pub fn depth(&self, id: RenderId) -> usize {
        self.node(id).map_or(0, |n| n.depth)
    }

    /// A node's laid-out size.
    #[must_use]
    pub fn size(&self, id: RenderId) -> Size {
        self.node(id).map_or(Size::ZERO, |n| n.size)
    }

    /// The offset a node's parent assigned to it.
    #[must_use]
    pub fn offset(&self, id: RenderId) -> Offset {
        self.node(id).map_or(Offset::ZERO, |n| n.offset)
    }

    /// A node's most recent constraints.
    #[must_use]
    pub fn constraints(&self, id: RenderId) -> Option<Constraints> {
        self.node(id).and_then(|n| n.constraints)
    }

    /// Whether the parent declared it uses this node's size.
    #[must_use]
    pub fn parent_uses_size(&self, id: RenderId) -> bool {
        self.node(id).is_some_and(|n| n.parent_uses_size)
    }

    /// Whether the node awaits layout.
    #[must_use]
    pub fn needs_layout(&self, id: RenderId) -> bool {
        self.node(id).is_some_and(|n| n.needs_layout)
    }

    pub(crate) fn clear_needs_layout(&mut self, id: RenderId) {
        if let Some(node) = self.node_mut(id) {
            node.needs_layout = false;
        }
    }

    /// The element owning this node.
    #[must_use]
    pub fn owner(&self, id: RenderId) -> Option<ElementId> {
        self.node(id).and_then(|n| n.owner)
    }

    /// Assign the owning element.
    pub fn set_owner(&mut self, id: RenderId, owner: ElementId) {
        if let Some(node) = self.node_mut(id) {
            node.owner = Some(owner);
        }
    }

    /// Mutable access to the object, for property sync.
    pub fn object_mut(&mut self, id: RenderId) -> Option<&mut (dyn RenderObject + '_)> {
        let node = self.node_mut(id)?;
        match node.object.as_mut() {
            Some(obj) => Some(&mut **obj),
            None => None,
        }
    }

    /// Mark a node dirty and propagate to its relayout boundary.
    ///
    /// Dirty layout walks up parent links; the walk stops at the nearest
    /// node that is its own relayout boundary (tight constraints, or a
    /// parent that does not use its size), which lands in the pipeline's
    /// layout set.
    pub fn mark_needs_layout(&mut self, id: RenderId, pipeline: &mut PipelineOwner) {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let Some(node) = self.node_mut(cursor) else {
                return;
            };
            node.needs_layout = true;
            let at_boundary = node.relayout_boundary == Some(cursor) || node.parent.is_none();
            let parent = node.parent;
            if at_boundary {
                pipeline.request_layout(cursor);
                return;
            }
            current = parent;
        }
    }

    /// Mark a node as needing repaint.
    pub fn mark_needs_paint(&mut self, id: RenderId, pipeline: &mut PipelineOwner) {
        if let Some(node) = self.node_mut(id) {
            node.needs_paint = true;
            pipeline.request_paint(id);
        }
    }

    /// Lay out a node and assign the (clamped) result as its size.
    ///
    /// A returned size violating the constraints is reported as a layout
    /// error and clamped; the frame continues.
    pub fn layout_node(
        &mut self,
        id: RenderId,
        constraints: Constraints,
        parent_uses_size: bool,
        errors: &mut Vec<FrameError>,
    ) -> Size {
        let Some(node) = self.node_mut(id) else {
            return Size::ZERO;
        };

        let parent = node.parent;
        let Some(mut object) = node.object.take() else {
            // Reentrant layout of a node already in flight.
            return node.size;
        };

        let boundary = if constraints.is_tight() || !parent_uses_size || parent.is_none() {
            Some(id)
        } else {
            parent
                .and_then(|p| self.node(p).and_then(|n| n.relayout_boundary))
                .or(Some(id))
        };

        let size = {
            let mut cx = LayoutContext {
                tree: self,
                id,
                errors,
            };
            object.layout(&mut cx, constraints)
        };

        let clamped = constraints.constrain(size);
        if !constraints.is_satisfied_by(size) {
            errors.push(FrameError::new(
                FramePhase::Layout,
                format!(
                    "{} returned {}x{} outside constraints \
                     [{}..{} x {}..{}]; clamped",
                    object.debug_name(),
                    size.width,
                    size.height,
                    constraints.min_width,
                    constraints.max_width,
                    constraints.min_height,
                    constraints.max_height,
                ),
            ));
        }

        if let Some(node) = self.node_mut(id) {
            node.object = Some(object);
            node.size = clamped;
            node.constraints = Some(constraints);
            node.parent_uses_size = parent_uses_size;
            node.relayout_boundary = boundary;
            node.needs_layout = false;
        }

        clamped
    }

    /// Paint a node (and through it, its subtree) at `offset`.
    ///
    /// Records the node's world rect for hit testing and clears its paint
    /// bit.
    pub fn paint_node(&mut self, id: RenderId, canvas: &mut Canvas<'_>, offset: Offset) {
        let Some(node) = self.node_mut(id) else {
            return;
        };

        let (x, y) = offset.to_cell();
        let (w, h) = node.size.to_cell();
        node.world_rect = Rect::new(x, y, w, h);
        node.needs_paint = false;

        let Some(object) = node.object.take() else {
            return;
        };

        {
            let mut cx = PaintContext {
                tree: self,
                canvas,
                id,
            };
            object.paint(&mut cx, offset);
        }

        if let Some(node) = self.node_mut(id) {
            node.object = Some(object);
        }
    }

    /// The chain of nodes under a point, innermost first.
    ///
    /// Uses the world rects recorded during the last paint. The chain
    /// starts at the deepest containing node and follows parent links to
    /// the root so callers can propagate outward.
    #[must_use]
    pub fn hit_chain(&self, x: u16, y: u16) -> Vec<RenderId> {
        let mut best: Option<(usize, RenderId)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(node) = slot.node.as_ref() else {
                continue;
            };
            if !node.world_rect.contains(x, y) {
                continue;
            }
            if best.map_or(true, |(depth, _)| node.depth > depth) {
                best = Some((
                    node.depth,
                    RenderId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                ));
            }
        }

        let mut chain = Vec::new();
        let mut current = best.map(|(_, id)| id);
        while let Some(id) = current {
            chain.push(id);
            current = self.node(id).and_then(|n| n.parent);
        }
        chain
    }
}

/// Child access during an object's own layout.
pub struct LayoutContext<'a> {
    tree: &'a mut RenderTree,
    id: RenderId,
    errors: &'a mut Vec<FrameError>,
}

impl LayoutContext<'_> {
    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.tree.node(self.id).map_or(0, |n| n.children.len())
    }

    fn child(&self, index: usize) -> Option<RenderId> {
        self.tree
            .node(self.id)
            .and_then(|n| n.children.get(index).copied())
    }

    /// Lay out the child at `index` and return its size.
    ///
    /// With `parent_uses_size == false` the child becomes a relayout
    /// boundary: its dirty layout never propagates into this node.
    pub fn layout_child(
        &mut self,
        index: usize,
        constraints: Constraints,
        parent_uses_size: bool,
    ) -> Size {
        match self.child(index) {
            Some(child) => {
                self.tree
                    .layout_node(child, constraints, parent_uses_size, self.errors)
            }
            None => Size::ZERO,
        }
    }

    /// Assign the child's offset within this node (its parent data).
    pub fn position_child(&mut self, index: usize, offset: Offset) {
        if let Some(child) = self.child(index) {
            if let Some(node) = self.tree.node_mut(child) {
                node.offset = offset;
            }
        }
    }

    /// The child's laid-out size.
    #[must_use]
    pub fn child_size(&self, index: usize) -> Size {
        self.child(index).map_or(Size::ZERO, |c| self.tree.size(c))
    }
}

/// Child access during an object's own paint.
pub struct PaintContext<'a, 'b> {
    tree: &'a mut RenderTree,
    canvas: &'a mut Canvas<'b>,
    id: RenderId,
}

impl<'a, 'b> PaintContext<'a, 'b> {
    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.tree.node(self.id).map_or(0, |n| n.children.len())
    }

    /// The canvas being painted into.
    pub fn canvas(&mut self) -> &mut Canvas<'b> {
        &mut *self.canvas
    }

    /// The offset assigned to the child at `index` during layout.
    #[must_use]
    pub fn child_offset(&self, index: usize) -> Offset {
        self.tree
            .node(self.id)
            .and_then(|n| n.children.get(index).copied())
            .map_or(Offset::ZERO, |c| self.tree.offset(c))
    }

    /// Paint the child at `index` at the given absolute offset.
    pub fn paint_child(&mut self, index: usize, offset: Offset) {
        let child = self
            .tree
            .node(self.id)
            .and_then(|n| n.children.get(index).copied());
        if let Some(child) = child {
            self.tree.paint_node(child, self.canvas, offset);
        }
    }

    /// Paint every child at `origin + child_offset`, in child order.
    pub fn paint_children(&mut self, origin: Offset) {
        for index in 0..self.child_count() {
            let offset = origin + self.child_offset(index);
            self.paint_child(index, offset);
        }
    }
}
