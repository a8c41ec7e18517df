#![forbid(unsafe_code)]

//! weft — a retained-mode terminal UI framework.
//!
//! Compose an immutable component tree from the widget library, hand the
//! root to a [`TerminalBinding`], and run the event loop. The binding keeps
//! a mutable element tree mirroring your descriptions, reconciles it when
//! components change, lays out and paints render objects into a cell
//! buffer, and flushes the result to the terminal as ANSI.
//!
//! ```no_run
//! use weft::{BindingConfig, Center, TerminalBinding, Text};
//!
//! fn main() -> std::io::Result<()> {
//!     let mut binding = TerminalBinding::new(BindingConfig::default())?;
//!     binding.attach_root(Box::new(Center::new(Box::new(Text::new("hello ✨")))));
//!     binding.run()
//! }
//! ```

pub use weft_core::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent};
pub use weft_core::geometry::{Constraints, EdgeInsets, Offset, Rect, Size};
pub use weft_core::input_parser::InputParser;
pub use weft_core::session::{SessionOptions, TerminalSession};
pub use weft_core::width::{rune_width, string_width};
pub use weft_render::{Buffer, Canvas, Cell, Color, FontWeight, Style};
pub use weft_runtime::{BindingConfig, Broadcast, ErrorSink, TerminalBinding};
pub use weft_tree::{
    can_update, Component, ElementId, ElementTree, FrameError, FramePhase, Instance, Key,
    LayoutContext, Nil, PaintContext, PipelineOwner, RenderId, RenderObject, RenderTree, State,
};
pub use weft_widgets::{
    Center, Column, Container, CrossAxisAlignment, DecoratedBox, MainAxisAlignment, Padding, Row,
    SizedBox, Text,
};
