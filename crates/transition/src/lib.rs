//! Earth to map transition for the sourcing section.
//!
//! The machine never talks to a widget library directly; it drives a
//! [`MapAdapter`] and records presentation changes as [`TransitionEffect`]s.

pub mod machine;
pub mod map_adapter;
pub mod pending;
pub mod plan;

pub use machine::*;
pub use map_adapter::*;
pub use pending::*;
pub use plan::*;
