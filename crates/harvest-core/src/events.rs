//! Per-tick events for audio and other observers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What happened to the player during one tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TickEvents: u8 {
        /// The player moved horizontally.
        const MOVED = 1 << 0;
        /// The player started a jump.
        const JUMPED = 1 << 1;
        /// An enemy touched the player and dealt damage.
        const HIT_ENEMY = 1 << 2;
        /// The player landed on an enemy from above.
        const STOMPED = 1 << 3;
        /// The player picked up a crop.
        const COLLECTED = 1 << 4;
        /// The last crop of the level was collected.
        const LEVEL_CLEARED = 1 << 5;
    }
}
