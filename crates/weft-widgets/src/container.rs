#![forbid(unsafe_code)]

//! Convenience container.
//!
//! A composed widget: it owns no render object of its own but builds a
//! chain of [`SizedBox`], [`DecoratedBox`], and [`Padding`] around its
//! child, outermost first. Only the wrappers that are actually configured
//! appear in the built description.

use std::any::Any;

use weft_core::geometry::EdgeInsets;
use weft_render::style::Style;
use weft_tree::{Component, Instance, Nil};

use crate::decorated_box::DecoratedBox;
use crate::padding::Padding;
use crate::sized_box::SizedBox;

/// Sizing, decoration, and padding around an optional child.
#[derive(Debug, Clone, Default)]
pub struct Container {
    width: Option<f32>,
    height: Option<f32>,
    padding: EdgeInsets,
    background: Option<Style>,
    border: Option<Style>,
    child: Option<Box<dyn Component>>,
}

impl Container {
    /// An empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the child.
    #[must_use]
    pub fn child(mut self, child: Box<dyn Component>) -> Self {
        self.child = Some(child);
        self
    }

    /// Fix the width.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Fix the height.
    #[must_use]
    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Pad the child.
    #[must_use]
    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    /// Fill the background.
    #[must_use]
    pub fn background(mut self, style: Style) -> Self {
        self.background = Some(style);
        self
    }

    /// Draw a border.
    #[must_use]
    pub fn border(mut self, style: Style) -> Self {
        self.border = Some(style);
        self
    }
}

impl Component for Container {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn instantiate(&self) -> Instance {
        Instance::Composed
    }

    fn build(&self) -> Box<dyn Component> {
        let mut current: Box<dyn Component> = match &self.child {
            Some(child) => child.clone(),
            None => Box::new(Nil),
        };

        if self.padding != EdgeInsets::ZERO {
            current = Box::new(Padding::new(self.padding, current));
        }
        if self.background.is_some() || self.border.is_some() {
            let mut decorated = DecoratedBox::new(current);
            if let Some(background) = self.background {
                decorated = decorated.background(background);
            }
            if let Some(border) = self.border {
                decorated = decorated.border(border);
            }
            current = Box::new(decorated);
        }
        match (self.width, self.height) {
            (Some(width), Some(height)) => Box::new(SizedBox::new(width, height, current)),
            (Some(width), None) => Box::new(SizedBox::width(width, current)),
            (None, Some(height)) => Box::new(SizedBox::height(height, current)),
            (None, None) => current,
        }
    }
}
