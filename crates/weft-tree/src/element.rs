#![forbid(unsafe_code)]

//! The element tree: the mutable spine between component descriptions and
//! render objects.
//!
//! Elements live in an arena keyed by stable [`ElementId`]s with owning
//! parent → child links and back-pointers used only for traversal. Each
//! element holds the component that currently describes it and one of three
//! bodies: composed (rebuilds via the component), stateful (rebuilds via a
//! long-lived [`State`]), or render (owns a node in the
//! [`RenderTree`](crate::render_tree::RenderTree)).
//!
//! # Reconciliation
//!
//! Building a child from a new description `c` against an existing element
//! `e`:
//!
//! 1. no `e` → **inflate** `c` into a new element, recursively;
//! 2. `e`'s component has the same concrete type as `c` and an equal (or
//!    equally absent) key → **update** in place and reconcile the children
//!    (lists match by index, falling back to key lookup);
//! 3. otherwise → **unmount** `e`'s subtree (states disposed, render
//!    objects detached) and inflate `c`.
//!
//! Identical rebuilds therefore preserve element and render object
//! identities, which is what keeps state alive across frames.

use std::collections::HashMap;

use weft_core::event::{KeyEvent, MouseEvent};

use crate::component::{can_update, Component, Instance, State};
use crate::pipeline::PipelineOwner;
use crate::render_tree::{RenderId, RenderTree};

/// Stable handle to an element in the [`ElementTree`].
///
/// Generational: a handle is invalidated when its element unmounts, so a
/// handle can never alias an element mounted later into the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

enum ElementBody {
    Composed,
    Stateful(Box<dyn State>),
    Render(RenderId),
}

struct ElementNode {
    component: Box<dyn Component>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    body: ElementBody,
    depth: usize,
    dirty: bool,
}

struct Slot {
    generation: u32,
    node: Option<ElementNode>,
}

/// Arena of elements plus the build-dirty list.
#[derive(Default)]
pub struct ElementTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<ElementId>,
    dirty: Vec<ElementId>,
}

impl ElementTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: ElementId) -> Option<&ElementNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn insert(&mut self, node: ElementNode) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            ElementId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            ElementId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// The root element, if mounted.
    #[must_use]
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Whether the element still exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The component currently describing an element.
    #[must_use]
    pub fn component(&self, id: ElementId) -> Option<&dyn Component> {
        self.node(id).map(|n| n.component.as_ref())
    }

    /// An element's children, in order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id).map_or_else(Vec::new, |n| n.children.clone())
    }

    /// An element's parent (traversal only).
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// The render object backing a render element.
    #[must_use]
    pub fn render_id(&self, id: ElementId) -> Option<RenderId> {
        match self.node(id)?.body {
            ElementBody::Render(render) => Some(render),
            _ => None,
        }
    }

    /// Whether the element holds per-element state.
    #[must_use]
    pub fn is_stateful(&self, id: ElementId) -> bool {
        matches!(self.node(id).map(|n| &n.body), Some(ElementBody::Stateful(_)))
    }

    /// Number of elements awaiting rebuild.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Queue an element for rebuild in the next build flush.
    pub fn mark_dirty(&mut self, id: ElementId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.dirty = true;
        if !self.dirty.contains(&id) {
            self.dirty.push(id);
        }
    }

    /// Mount `component` as the root, replacing any previous tree.
    pub fn mount_root(
        &mut self,
        component: Box<dyn Component>,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) -> ElementId {
        if let Some(old) = self.root.take() {
            self.unmount(old, render, pipeline);
        }
        let id = self.inflate(component, None, 0, render, pipeline);
        self.root = Some(id);
        self.wire_render_tree(render);
        id
    }

    /// Reconcile a new root description against the mounted tree.
    ///
    /// Updates in place when the root component's identity matches,
    /// otherwise tears the tree down and mounts fresh.
    pub fn update_root(
        &mut self,
        component: Box<dyn Component>,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) -> ElementId {
        let compatible = self.root.filter(|&root| {
            self.component(root)
                .is_some_and(|old| can_update(old, component.as_ref()))
        });
        match compatible {
            Some(root) => {
                self.update_element(root, component, render, pipeline);
                self.wire_render_tree(render);
                root
            }
            None => self.mount_root(component, render, pipeline),
        }
    }

    /// Create an element (and its subtree) for a fresh description.
    fn inflate(
        &mut self,
        component: Box<dyn Component>,
        parent: Option<ElementId>,
        depth: usize,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) -> ElementId {
        match component.instantiate() {
            Instance::Composed => {
                let child_description = component.build();
                let id = self.insert(ElementNode {
                    component,
                    parent,
                    children: Vec::new(),
                    body: ElementBody::Composed,
                    depth,
                    dirty: false,
                });
                let child = self.inflate(child_description, Some(id), depth + 1, render, pipeline);
                if let Some(node) = self.node_mut(id) {
                    node.children.push(child);
                }
                id
            }
            Instance::Stateful(mut state) => {
                state.init();
                let child_description = state.build(component.as_ref());
                let id = self.insert(ElementNode {
                    component,
                    parent,
                    children: Vec::new(),
                    body: ElementBody::Stateful(state),
                    depth,
                    dirty: false,
                });
                let child = self.inflate(child_description, Some(id), depth + 1, render, pipeline);
                if let Some(node) = self.node_mut(id) {
                    node.children.push(child);
                }
                id
            }
            Instance::Render(object) => {
                let render_id = render.insert(object);
                let child_descriptions = component.children();
                let id = self.insert(ElementNode {
                    component,
                    parent,
                    children: Vec::new(),
                    body: ElementBody::Render(render_id),
                    depth,
                    dirty: false,
                });
                render.set_owner(render_id, id);
                pipeline.request_layout(render_id);

                let mut children = Vec::with_capacity(child_descriptions.len());
                for description in child_descriptions {
                    children.push(self.inflate(description, Some(id), depth + 1, render, pipeline));
                }
                if let Some(node) = self.node_mut(id) {
                    node.children = children;
                }
                id
            }
        }
    }

    /// Destroy an element and its subtree: states disposed, render objects
    /// detached from the render tree and the pipeline's dirty sets.
    fn unmount(&mut self, id: ElementId, render: &mut RenderTree, pipeline: &mut PipelineOwner) {
        let children = self.children(id);
        for child in children {
            self.unmount(child, render, pipeline);
        }

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
        self.free.push(id.index);
        self.dirty.retain(|&d| d != id);
        if self.root == Some(id) {
            self.root = None;
        }

        match node.body {
            ElementBody::Composed => {}
            ElementBody::Stateful(mut state) => state.dispose(),
            ElementBody::Render(render_id) => render.remove(render_id, pipeline),
        }
    }

    /// Replace an element's component in place (same type and key) and
    /// reconcile its subtree.
    fn update_element(
        &mut self,
        id: ElementId,
        new_component: Box<dyn Component>,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) {
        {
            let Some(node) = self.node_mut(id) else {
                return;
            };
            node.component = new_component;
            if let ElementBody::Stateful(state) = &mut node.body {
                state.did_update_component(node.component.as_ref());
            }
        }

        if let Some(render_id) = self.render_id(id) {
            if let Some(node) = self.node(id) {
                if let Some(object) = render.object_mut(render_id) {
                    node.component.update_render_object(object);
                }
            }
            render.mark_needs_layout(render_id, pipeline);
        }

        self.rebuild(id, render, pipeline);
    }

    /// Rebuild an element: produce the new child description(s) and
    /// reconcile them against the existing children.
    fn rebuild(&mut self, id: ElementId, render: &mut RenderTree, pipeline: &mut PipelineOwner) {
        let (is_render, child_descriptions) = {
            let Some(node) = self.node_mut(id) else {
                return;
            };
            node.dirty = false;
            match &mut node.body {
                ElementBody::Composed => (false, vec![node.component.build()]),
                ElementBody::Stateful(state) => (false, vec![state.build(node.component.as_ref())]),
                ElementBody::Render(_) => (true, node.component.children()),
            }
        };
        self.dirty.retain(|&d| d != id);

        if is_render {
            self.update_children(id, child_descriptions, render, pipeline);
        } else {
            let old = self.children(id).first().copied();
            let description = child_descriptions.into_iter().next();
            let new_child = self.update_child(id, old, description, render, pipeline);
            if let Some(node) = self.node_mut(id) {
                node.children = new_child.into_iter().collect();
            }
        }
    }

    /// Reconcile one child slot.
    fn update_child(
        &mut self,
        parent: ElementId,
        old: Option<ElementId>,
        new: Option<Box<dyn Component>>,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) -> Option<ElementId> {
        let depth = self.node(parent).map_or(0, |n| n.depth) + 1;
        match (old, new) {
            (None, None) => None,
            (Some(old_id), None) => {
                self.unmount(old_id, render, pipeline);
                None
            }
            (None, Some(description)) => {
                Some(self.inflate(description, Some(parent), depth, render, pipeline))
            }
            (Some(old_id), Some(description)) => {
                let compatible = self
                    .component(old_id)
                    .is_some_and(|old| can_update(old, description.as_ref()));
                if compatible {
                    self.update_element(old_id, description, render, pipeline);
                    Some(old_id)
                } else {
                    self.unmount(old_id, render, pipeline);
                    Some(self.inflate(description, Some(parent), depth, render, pipeline))
                }
            }
        }
    }

    /// Reconcile a child list by index with key-aware matching.
    ///
    /// Each new description first tries the old child at the same index;
    /// failing that, a keyed description may claim a displaced old child
    /// with the same key. Old children left unclaimed are unmounted.
    fn update_children(
        &mut self,
        parent: ElementId,
        descriptions: Vec<Box<dyn Component>>,
        render: &mut RenderTree,
        pipeline: &mut PipelineOwner,
    ) {
        let depth = self.node(parent).map_or(0, |n| n.depth) + 1;
        let old: Vec<ElementId> = self.children(parent);

        let mut by_key: HashMap<String, ElementId> = HashMap::new();
        for &child in &old {
            if let Some(key) = self.component(child).and_then(Component::key) {
                by_key.insert(key.as_str().to_owned(), child);
            }
        }

        let mut claimed: Vec<ElementId> = Vec::new();
        let mut new_children: Vec<ElementId> = Vec::with_capacity(descriptions.len());

        for (index, description) in descriptions.into_iter().enumerate() {
            let positional = old
                .get(index)
                .copied()
                .filter(|id| !claimed.contains(id))
                .filter(|&id| {
                    self.component(id)
                        .is_some_and(|c| can_update(c, description.as_ref()))
                });

            let keyed = description.key().and_then(|key| {
                by_key
                    .get(key.as_str())
                    .copied()
                    .filter(|id| !claimed.contains(id))
                    .filter(|&id| {
                        self.component(id)
                            .is_some_and(|c| can_update(c, description.as_ref()))
                    })
            });

            match positional.or(keyed) {
                Some(existing) => {
                    claimed.push(existing);
                    self.update_element(existing, description, render, pipeline);
                    new_children.push(existing);
                }
                None => {
                    new_children
                        .push(self.inflate(description, Some(parent), depth, render, pipeline));
                }
            }
        }

        for child in old {
            if !claimed.contains(&child) {
                self.unmount(child, render, pipeline);
            }
        }

        if let Some(node) = self.node_mut(parent) {
            node.children = new_children;
        }
    }

    /// Rebuild every dirty element, shallowest first.
    ///
    /// A parent rebuild reconciles (and un-dirties) its descendants, so
    /// child entries that were subsumed are skipped when their turn comes.
    pub fn flush_build(&mut self, render: &mut RenderTree, pipeline: &mut PipelineOwner) {
        while !self.dirty.is_empty() {
            let mut batch = std::mem::take(&mut self.dirty);
            batch.sort_by_key(|&id| self.node(id).map_or(0, |n| n.depth));
            for id in batch {
                let still_dirty = self.node(id).is_some_and(|n| n.dirty);
                if still_dirty {
                    self.rebuild(id, render, pipeline);
                }
            }
        }
        self.wire_render_tree(render);
    }

    /// Rebuild the render tree's structure from the element tree.
    ///
    /// Each render element's render children are the render objects of its
    /// nearest render descendants, in element order; the render root is the
    /// first render descendant of the element root.
    pub fn wire_render_tree(&self, render: &mut RenderTree) {
        let Some(root) = self.root else {
            render.set_root(None);
            return;
        };
        self.wire_node(root, render);

        let mut roots = Vec::new();
        self.collect_render_roots(root, &mut roots);
        render.set_root(roots.first().copied());
    }

    fn wire_node(&self, id: ElementId, render: &mut RenderTree) {
        let Some(node) = self.node(id) else {
            return;
        };
        if let ElementBody::Render(render_id) = node.body {
            let mut kids = Vec::new();
            for &child in &node.children {
                self.collect_render_roots(child, &mut kids);
            }
            render.set_children(render_id, kids);
        }
        for &child in &node.children {
            self.wire_node(child, render);
        }
    }

    fn collect_render_roots(&self, id: ElementId, out: &mut Vec<RenderId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        match node.body {
            ElementBody::Render(render_id) => out.push(render_id),
            _ => {
                for &child in &node.children {
                    self.collect_render_roots(child, out);
                }
            }
        }
    }

    /// Route a keyboard event through the tree.
    ///
    /// Children are visited depth-first; on the way back up each stateful
    /// element may consume the event. The first handler wins; the handling
    /// element is returned so the caller can mark it dirty.
    pub fn dispatch_key(&mut self, event: &KeyEvent) -> Option<ElementId> {
        let root = self.root?;
        self.dispatch_key_from(root, event)
    }

    fn dispatch_key_from(&mut self, id: ElementId, event: &KeyEvent) -> Option<ElementId> {
        for child in self.children(id) {
            if let Some(handler) = self.dispatch_key_from(child, event) {
                return Some(handler);
            }
        }
        if let Some(node) = self.node_mut(id) {
            if let ElementBody::Stateful(state) = &mut node.body {
                if state.handle_key(event) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Offer a scroll event to an element and then its ancestors.
    ///
    /// `start` is usually the owner of the innermost hit render object.
    /// Returns the element that consumed the event.
    pub fn dispatch_scroll(&mut self, start: ElementId, event: &MouseEvent) -> Option<ElementId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let parent = self.parent(id);
            if let Some(node) = self.node_mut(id) {
                if let ElementBody::Stateful(state) = &mut node.body {
                    if state.handle_scroll(event) {
                        return Some(id);
                    }
                }
            }
            current = parent;
        }
        None
    }
}
