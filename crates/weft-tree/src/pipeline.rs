#![forbid(unsafe_code)]

//! The pipeline owner: dirty-set bookkeeping between frames.
//!
//! Holds the set of render objects needing layout, the set needing paint,
//! and the needs-visual-update callback the binding installs to learn that
//! a frame should be scheduled. Within one frame the ordering guarantee is
//! build ≺ layout ≺ paint: [`PipelineOwner::flush_layout`] runs entirely
//! before [`PipelineOwner::flush_paint`].

use std::fmt;

use weft_core::geometry::Offset;
use weft_render::canvas::Canvas;

use crate::render_tree::{RenderId, RenderTree};

/// The frame phase an error surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Component rebuild.
    Build,
    /// Layout flush.
    Layout,
    /// Paint flush.
    Paint,
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Layout => write!(f, "layout"),
            Self::Paint => write!(f, "paint"),
        }
    }
}

/// A non-fatal failure raised by build, layout, or paint.
///
/// Routed to the binding's error sink; the frame continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameError {
    /// Which phase raised the error.
    pub phase: FramePhase,
    /// Human-readable description.
    pub message: String,
}

impl FrameError {
    /// Create a frame error.
    #[must_use]
    pub fn new(phase: FramePhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.phase, self.message)
    }
}

/// Tracks which render objects need layout and paint work.
#[derive(Default)]
pub struct PipelineOwner {
    needs_layout: Vec<RenderId>,
    needs_paint: Vec<RenderId>,
    on_needs_visual_update: Option<Box<dyn FnMut()>>,
    errors: Vec<FrameError>,
}

impl fmt::Debug for PipelineOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOwner")
            .field("needs_layout", &self.needs_layout)
            .field("needs_paint", &self.needs_paint)
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl PipelineOwner {
    /// Create an empty pipeline owner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback fired whenever visual state becomes dirty.
    pub fn set_on_needs_visual_update(&mut self, callback: Box<dyn FnMut()>) {
        self.on_needs_visual_update = Some(callback);
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_needs_visual_update.as_mut() {
            callback();
        }
    }

    /// Add a node to the layout set and request a visual update.
    pub fn request_layout(&mut self, id: RenderId) {
        if !self.needs_layout.contains(&id) {
            self.needs_layout.push(id);
        }
        self.notify();
    }

    /// Add a node to the paint set and request a visual update.
    pub fn request_paint(&mut self, id: RenderId) {
        if !self.needs_paint.contains(&id) {
            self.needs_paint.push(id);
        }
        self.notify();
    }

    /// Drop a node from both sets (on detach).
    pub fn forget(&mut self, id: RenderId) {
        self.needs_layout.retain(|&n| n != id);
        self.needs_paint.retain(|&n| n != id);
    }

    /// Number of nodes awaiting layout.
    #[must_use]
    pub fn layout_backlog(&self) -> usize {
        self.needs_layout.len()
    }

    /// Number of nodes awaiting paint.
    #[must_use]
    pub fn paint_backlog(&self) -> usize {
        self.needs_paint.len()
    }

    /// Record an error for the binding to drain after the frame.
    pub fn report(&mut self, error: FrameError) {
        tracing::debug!(phase = %error.phase, message = %error.message, "frame error");
        self.errors.push(error);
    }

    /// Take the errors accumulated since the last drain.
    pub fn take_errors(&mut self) -> Vec<FrameError> {
        std::mem::take(&mut self.errors)
    }

    /// Re-lay out every dirty node, shallowest first.
    ///
    /// Each node re-runs with its most recent constraints. Requests made
    /// recursively while the flush runs are absorbed into the same flush.
    /// Nodes whose dirty bit was already cleared by an ancestor's layout
    /// are skipped.
    pub fn flush_layout(&mut self, tree: &mut RenderTree) {
        while !self.needs_layout.is_empty() {
            let mut batch = std::mem::take(&mut self.needs_layout);
            batch.sort_by_key(|&id| tree.depth(id));
            for id in batch {
                if !tree.needs_layout(id) {
                    continue;
                }
                let Some(constraints) = tree.constraints(id) else {
                    // Never laid out through a parent yet; the root pass
                    // will reach it.
                    tree.clear_needs_layout(id);
                    continue;
                };
                let parent_uses_size = tree.parent_uses_size(id);
                tree.layout_node(id, constraints, parent_uses_size, &mut self.errors);
            }
        }
    }

    /// Paint the tree into `canvas` and drain the paint set.
    ///
    /// Frames paint into a fresh buffer, so the root subsumes every dirty
    /// paint subtree.
    pub fn flush_paint(&mut self, tree: &mut RenderTree, canvas: &mut Canvas<'_>) {
        self.needs_paint.clear();
        if let Some(root) = tree.root() {
            tree.paint_node(root, canvas, Offset::ZERO);
        }
    }
}
