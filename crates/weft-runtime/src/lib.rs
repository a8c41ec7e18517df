#![forbid(unsafe_code)]

//! The weft runtime: the terminal binding that owns the element tree, the
//! pipeline owner, the input and resize sources, and the frame scheduler.

pub mod binding;
pub mod broadcast;

pub use binding::{BindingConfig, ErrorSink, TerminalBinding};
pub use broadcast::Broadcast;
