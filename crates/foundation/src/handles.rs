use serde::{Deserialize, Serialize};

/// Identifies one scheduled action on the sequencer timeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Opaque handle to a map widget instance created by a map adapter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapHandle(pub u32);

/// Opaque handle to a marker on a map widget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub u32);
