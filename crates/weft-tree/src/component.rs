#![forbid(unsafe_code)]

//! Component descriptions and per-element state.
//!
//! A [`Component`] is an immutable description of a piece of UI. The element
//! tree mirrors component trees with mutable elements; reconciliation keys
//! off a component's concrete type plus its optional [`Key`].
//!
//! A component is one of three shapes, chosen by [`Component::instantiate`]:
//!
//! - **Composed**: pure composition, [`Component::build`] supplies the child
//!   description on every rebuild.
//! - **Stateful**: owns a [`State`] object created once per element; the
//!   state survives component updates and drives `build`.
//! - **Render**: backs a [`RenderObject`] in the layout/paint tree;
//!   [`Component::update_render_object`] syncs properties on update and
//!   [`Component::children`] lists the child descriptions.

use std::any::Any;
use std::fmt;

use weft_core::event::{KeyEvent, MouseEvent};
use weft_core::geometry::{Constraints, Offset, Size};

use crate::render_object::RenderObject;
use crate::render_tree::{LayoutContext, PaintContext};

/// An identity key for reconciliation.
///
/// Two components of the same type and equal keys update the same element;
/// differing keys force a remount even when the types match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Create a key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The key's string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What an element becomes when a component is first mounted.
pub enum Instance {
    /// Pure composition; `build` supplies the child description.
    Composed,
    /// Long-lived state drives `build` across component updates.
    Stateful(Box<dyn State>),
    /// Backs a node in the layout/paint tree.
    Render(Box<dyn RenderObject>),
}

/// An immutable description of a piece of UI.
pub trait Component: fmt::Debug {
    /// Reconciliation key, if any.
    fn key(&self) -> Option<&Key> {
        None
    }

    /// Type identity access for reconciliation and downcasts.
    fn as_any(&self) -> &dyn Any;

    /// Clone into a boxed trait object.
    fn clone_boxed(&self) -> Box<dyn Component>;

    /// The element shape this component mounts as.
    fn instantiate(&self) -> Instance;

    /// Produce the child description (composed components only).
    fn build(&self) -> Box<dyn Component> {
        Box::new(Nil)
    }

    /// Sync properties into an existing render object (render components
    /// only). Called when an element is updated in place.
    fn update_render_object(&self, _object: &mut dyn RenderObject) {}

    /// Child descriptions (render components only).
    fn children(&self) -> Vec<Box<dyn Component>> {
        Vec::new()
    }
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Whether `new` can update the element currently holding `old`:
/// same concrete type and equal (or equally absent) keys.
#[must_use]
pub fn can_update(old: &dyn Component, new: &dyn Component) -> bool {
    old.as_any().type_id() == new.as_any().type_id() && old.key() == new.key()
}

/// Per-element mutable state for stateful components.
///
/// Created once on first mount, survives component updates, disposed on
/// unmount. The input capabilities return `true` when the event was
/// consumed; a consumed event marks the owning element dirty.
pub trait State {
    /// Called once after the state is created, before the first build.
    fn init(&mut self) {}

    /// Called when the element's component is replaced in an update.
    fn did_update_component(&mut self, _component: &dyn Component) {}

    /// Produce the child description from the current component and state.
    fn build(&mut self, component: &dyn Component) -> Box<dyn Component>;

    /// Called when the element is unmounted.
    fn dispose(&mut self) {}

    /// Offer a keyboard event; return `true` to consume it.
    fn handle_key(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    /// Offer a scroll event; return `true` to consume it.
    fn handle_scroll(&mut self, _event: &MouseEvent) -> bool {
        false
    }
}

/// A component that renders nothing and occupies the smallest size its
/// constraints allow.
#[derive(Debug, Clone)]
pub struct Nil;

impl Component for Nil {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Render(Box::new(NilRender))
    }
}

/// The render object behind [`Nil`].
#[derive(Debug)]
struct NilRender;

impl RenderObject for NilRender {
    fn layout(&mut self, _cx: &mut LayoutContext<'_>, constraints: Constraints) -> Size {
        constraints.smallest()
    }

    fn paint(&self, _cx: &mut PaintContext<'_, '_>, _offset: Offset) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
