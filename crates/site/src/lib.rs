//! The page controller: one explicit context object owning every interactive
//! component, the shared sequencer timeline and the static catalogs.

pub mod config;
pub mod controller;
pub mod counters;
pub mod navbar;
pub mod tabs;
pub mod trace;

pub use config::*;
pub use controller::*;
pub use counters::*;
pub use navbar::*;
pub use tabs::*;
pub use trace::*;
