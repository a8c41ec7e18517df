#![forbid(unsafe_code)]

//! Rendering kernel: styles, cells, buffers, clipped canvases, and ANSI
//! frame emission.

pub mod ansi;
pub mod buffer;
pub mod canvas;
pub mod cell;
pub mod emit;
pub mod style;

pub use buffer::Buffer;
pub use canvas::Canvas;
pub use cell::Cell;
pub use style::{Color, FontWeight, Style};
