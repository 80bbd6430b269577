#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-update timing handed in by the host: the current simulation tick and
/// the interval covered by this update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
}
