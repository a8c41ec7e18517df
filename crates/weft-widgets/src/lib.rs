#![forbid(unsafe_code)]

//! The weft widget library.
//!
//! Each widget is a [`Component`](weft_tree::Component) paired with a
//! render object implementing the layout/paint protocol. Compose them into
//! a description tree and hand the root to the terminal binding.

pub mod center;
pub mod container;
pub mod decorated_box;
pub mod flex;
pub mod padding;
pub mod sized_box;
pub mod text;

pub use center::Center;
pub use container::Container;
pub use decorated_box::DecoratedBox;
pub use flex::{Column, CrossAxisAlignment, MainAxisAlignment, Row};
pub use padding::Padding;
pub use sized_box::SizedBox;
pub use text::Text;
