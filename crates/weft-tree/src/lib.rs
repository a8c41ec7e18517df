#![forbid(unsafe_code)]

//! The retained tree: immutable component descriptions, the mutable element
//! spine that mirrors them, render objects that lay out and paint, and the
//! pipeline owner that tracks dirty state between frames.

pub mod component;
pub mod element;
pub mod pipeline;
pub mod render_object;
pub mod render_tree;

pub use component::{can_update, Component, Instance, Key, Nil, State};
pub use element::{ElementId, ElementTree};
pub use pipeline::{FrameError, FramePhase, PipelineOwner};
pub use render_object::RenderObject;
pub use render_tree::{LayoutContext, PaintContext, RenderId, RenderTree};
