//! Index/gesture state machine shared by the showcase and card-deck carousels.

pub mod config;
pub mod direction;
pub mod engine;
pub mod layout;

pub use config::*;
pub use direction::*;
pub use engine::*;
pub use layout::*;
