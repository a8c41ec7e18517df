#![forbid(unsafe_code)]

//! Core types for the weft terminal UI framework: geometry, Unicode display
//! width, canonical input events, the byte-stream input parser, and the
//! terminal session guard.

pub mod event;
pub mod geometry;
pub mod input_parser;
pub mod session;
pub mod width;
