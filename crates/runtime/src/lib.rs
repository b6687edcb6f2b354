pub mod event_bus;
pub mod phase;
pub mod timeline;

pub use event_bus::*;
pub use phase::*;
pub use timeline::*;
