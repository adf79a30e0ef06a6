//! Player input for one tick.

use serde::{Deserialize, Serialize};

/// Normalized input supplied by the host each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal intent: -1, 0 or 1. Other values are clamped.
    pub move_axis: f32,
    /// Jump if standing on ground.
    pub wants_jump: bool,
    /// Run faster.
    pub sprint: bool,
    /// Dig out the tile under the player's feet.
    pub break_block: bool,
}

impl PlayerInput {
    /// No input.
    pub const IDLE: Self = Self {
        move_axis: 0.0,
        wants_jump: false,
        sprint: false,
        break_block: false,
    };

    /// Walking in `axis` direction.
    #[must_use]
    pub const fn walk(axis: f32) -> Self {
        Self {
            move_axis: axis,
            ..Self::IDLE
        }
    }

    /// Jumping in place.
    #[must_use]
    pub const fn jump() -> Self {
        Self {
            wants_jump: true,
            ..Self::IDLE
        }
    }

    /// Horizontal axis clamped to `[-1, 1]`.
    #[must_use]
    pub fn axis(&self) -> f32 {
        self.move_axis.clamp(-1.0, 1.0)
    }
}
