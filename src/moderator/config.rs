//! Moderator Configuration

use serde::{Deserialize, Serialize};

/// Timing knobs for the auction state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModeratorConfig {
    /// Seconds on the clock for each lot; every accepted bid resets to this
    pub bid_timeout_secs: u32,
    /// Ticks to hold the `ended` state before moving to the next player
    pub settle_ticks: u32,
    /// Wall-clock length of one tick (ms). One tick is one auction second.
    pub tick_ms: u64,
    /// Capacity of the moderator command channel
    pub command_buffer: usize,
}

impl Default for ModeratorConfig {
    fn default() -> Self {
        Self {
            bid_timeout_secs: 15,
            settle_ticks: 3,
            tick_ms: 1000,
            command_buffer: 256,
        }
    }
}
