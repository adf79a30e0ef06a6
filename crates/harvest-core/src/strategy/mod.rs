//! AI strategy engine.
//!
//! Every AI entity is in exactly one [`Strategy`] at a time. Each tick the
//! [`StrategyEngine`] runs the behavior of that strategy against a shared
//! [`SimulationContext`], which sets the entity's velocity, moves it (through
//! the collision resolver for ground movers) and may change strategy.
//!
//! ```text
//!   Patrol ──(controlled entity within 100 px)──▶ Transition ──(1 s)──▶ ChaseEnemy
//!     ▲                                                                    │
//!     └──────── Transition ◀──(target lost > 3 s, chased ≥ 3 s)────────────┘
//! ```
//!
//! Flyers run [`Strategy::RandomFlyingMovement`] or
//! [`Strategy::Random360FlyingMovement`] and never change strategy on their own.
//! [`Strategy::Idle`], [`Strategy::AvoidEnemy`] and [`Strategy::ChargeEnemy`]
//! are accepted states with no behavior.
//!
//! Every strategy change is appended to the entity's [`StrategyHistory`].

mod flying;
mod ground;

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::context::SimulationContext;
use crate::entity::Entity;
use crate::error::CoreError;
use crate::resolver::Resolution;

// =============================================================================
// Strategy
// =============================================================================

/// Behavior mode of an AI entity.
///
/// Stored and saved as its `u8` code; unknown codes are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Strategy {
    /// Does nothing.
    Idle = 0,
    /// Timed pause before committing to the pending strategy.
    Transition = 1,
    /// Placeholder, does nothing.
    AvoidEnemy = 2,
    /// Flies in a cardinal direction, turning clockwise at random intervals.
    RandomFlyingMovement = 3,
    /// Flies at a random angle, bouncing off the map and the ground.
    Random360FlyingMovement = 4,
    /// Walks back and forth inside the patrol band, watching for the player.
    Patrol = 5,
    /// Walks toward the player or where it was last seen.
    ChaseEnemy = 6,
    /// Placeholder, does nothing.
    ChargeEnemy = 7,
}

impl Strategy {
    /// Every strategy, in code order.
    pub const ALL: [Self; 8] = [
        Self::Idle,
        Self::Transition,
        Self::AvoidEnemy,
        Self::RandomFlyingMovement,
        Self::Random360FlyingMovement,
        Self::Patrol,
        Self::ChaseEnemy,
        Self::ChargeEnemy,
    ];

    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Name as written in save data and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Transition => "Transition",
            Self::AvoidEnemy => "AvoidEnemy",
            Self::RandomFlyingMovement => "RandomFlyingMovement",
            Self::Random360FlyingMovement => "Random360FlyingMovement",
            Self::Patrol => "Patrol",
            Self::ChaseEnemy => "ChaseEnemy",
            Self::ChargeEnemy => "ChargeEnemy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Strategy {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| CoreError::InvalidStrategy(format!("unknown strategy code {code}")))
    }
}

impl From<Strategy> for u8 {
    fn from(strategy: Strategy) -> Self {
        strategy.code()
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| CoreError::InvalidStrategy(format!("unknown strategy {s:?}")))
    }
}

// =============================================================================
// History
// =============================================================================

/// One entry of a strategy history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecord {
    /// Strategy entered.
    pub strategy: Strategy,
    /// When it was entered.
    pub start_time: f32,
    /// Last timed action taken in it (patrol reversal, flight turn).
    pub last_action_time: f32,
}

/// Append-only log of strategy changes.
///
/// Records are never removed or reordered. Only the newest record's
/// `last_action_time` may change after it is written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyHistory(Vec<StrategyRecord>);

impl StrategyHistory {
    /// Appends a record for entering `strategy` at `now`.
    ///
    /// The start time never precedes the newest record's, so a clock wound
    /// back by a restore keeps the log ordered.
    pub fn record(&mut self, strategy: Strategy, now: f32) {
        let start_time = self.0.last().map_or(now, |last| now.max(last.start_time));
        self.0.push(StrategyRecord {
            strategy,
            start_time,
            last_action_time: now,
        });
    }

    /// Stamps the newest record's `last_action_time`.
    pub fn touch(&mut self, now: f32) {
        if let Some(last) = self.0.last_mut() {
            last.last_action_time = now;
        }
    }

    /// Pulls the newest record's `last_action_time` back to `now` if it is later.
    pub fn rewind(&mut self, now: f32) {
        if let Some(last) = self.0.last_mut() {
            last.last_action_time = last.last_action_time.min(now);
        }
    }

    /// Newest record.
    #[must_use]
    pub fn last(&self) -> Option<&StrategyRecord> {
        self.0.last()
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[StrategyRecord] {
        &self.0
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Runs the strategy of AI entities, one entity per call.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    rng: ChaCha8Rng,
}

impl StrategyEngine {
    /// Creates an engine whose random draws follow `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Advances one AI entity by a tick.
    ///
    /// Entities without movement or AI state, and inactive entities, are left
    /// untouched. The entity's shape is synced to its new position.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidStrategy`] if a `Transition` has nothing valid
    /// staged to commit to.
    pub fn advance(
        &mut self,
        entity: &mut Entity,
        ctx: &SimulationContext<'_>,
    ) -> Result<Resolution, CoreError> {
        if !entity.is_active() {
            return Ok(Resolution::default());
        }
        let shape = entity.shape;
        let (Some(movement), Some(ai)) = (entity.movement.as_mut(), entity.ai.as_mut()) else {
            return Ok(Resolution::default());
        };

        let resolution = match ai.strategy {
            Strategy::Patrol => ground::patrol(movement, ai, &shape, ctx),
            Strategy::ChaseEnemy => ground::chase(movement, ai, &shape, ctx),
            Strategy::Transition => ground::transition(movement, ai, &shape, ctx)?,
            Strategy::RandomFlyingMovement => {
                flying::cardinal(movement, ai, &shape, ctx, &mut self.rng)
            }
            Strategy::Random360FlyingMovement => {
                flying::free(movement, ai, &shape, ctx, &mut self.rng)
            }
            Strategy::Idle | Strategy::AvoidEnemy | Strategy::ChargeEnemy => Resolution::default(),
        };

        entity.sync_shape();
        Ok(resolution)
    }
}
