//! Entities of the level.
//!
//! - [`EntityId`]: unique identifier, ordered by spawn order
//! - [`EntityKind`]: what the entity is and which systems drive it
//! - [`Entity`]: the flat record of optional components
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use harvest_core::entity::{Entity, EntityId, EntityKind};
//!
//! let player = Entity::new(EntityId::new(0), EntityKind::Player, Vec2::new(32.0, 64.0), Vec2::new(28.0, 48.0), 0.0);
//!
//! assert!(player.movement.is_some());
//! assert!(player.health.is_some());
//! assert!(player.ai.is_none());
//! assert_eq!(player.position(), Vec2::new(32.0, 64.0));
//! ```

pub mod components;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::shape::CollisionShape;
use crate::strategy::Strategy;

pub use components::{AiState, Collectible, Direction, Health, MovementState};

/// Unique identifier for an entity.
///
/// Ids are handed out monotonically by the roster, so ordering by id is
/// ordering by spawn time. Every per-tick iteration runs in this order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// What an entity is.
///
/// The kind fixes which components [`Entity::new`] attaches and which shape
/// the entity collides with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The controlled entity.
    Player,
    /// Ground enemy, starts patrolling.
    Walker,
    /// Flying enemy, starts on a random flight.
    Flyer,
    /// Crop to harvest.
    Crop,
}

impl EntityKind {
    /// Moved by input, target of AI detection.
    #[must_use]
    pub const fn is_controlled(self) -> bool {
        matches!(self, Self::Player)
    }

    /// Driven by the strategy engine.
    #[must_use]
    pub const fn is_ai(self) -> bool {
        matches!(self, Self::Walker | Self::Flyer)
    }

    /// Strategy an AI entity of this kind starts in.
    #[must_use]
    pub const fn initial_strategy(self) -> Option<Strategy> {
        match self {
            Self::Walker => Some(Strategy::Patrol),
            Self::Flyer => Some(Strategy::RandomFlyingMovement),
            Self::Player | Self::Crop => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Walker => write!(f, "Walker"),
            Self::Flyer => write!(f, "Flyer"),
            Self::Crop => write!(f, "Crop"),
        }
    }
}

/// A level entity: a collision shape plus optional components.
///
/// For movers the authoritative position is [`MovementState::position`]; the
/// shape follows it through [`Entity::sync_shape`] once a move is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    /// Collision bounds, reference point at the top-left corner.
    pub shape: CollisionShape,
    /// Kinematics; absent for static entities.
    pub movement: Option<MovementState>,
    /// Strategy state; present on AI entities.
    pub ai: Option<AiState>,
    /// Hit points; present on the player.
    pub health: Option<Health>,
    /// Pickup state; present on crops.
    pub collectible: Option<Collectible>,
    /// Set when the entity leaves play. The roster drops it at end of tick.
    pub destroyed: bool,
}

impl Entity {
    /// Builds an entity of `kind` at `position` with bounding `size`.
    ///
    /// Flyers and crops get a circle inscribed in `size`; everything else a
    /// rectangle. AI kinds start in their initial strategy at time `now`.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, position: Vec2, size: Vec2, now: f32) -> Self {
        let shape = match kind {
            EntityKind::Flyer | EntityKind::Crop => {
                CollisionShape::circle(position, size.x.min(size.y) * 0.5)
            }
            EntityKind::Player | EntityKind::Walker => CollisionShape::rectangle(position, size),
        };
        let movement = match kind {
            EntityKind::Crop => None,
            _ => Some(MovementState::at(position)),
        };

        Self {
            id,
            kind,
            shape,
            movement,
            ai: kind.initial_strategy().map(|s| AiState::new(s, now)),
            health: kind.is_controlled().then(Health::default),
            collectible: matches!(kind, EntityKind::Crop).then(Collectible::default),
            destroyed: false,
        }
    }

    /// Unique id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Top-left corner of the bounding box.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.movement
            .as_ref()
            .map_or_else(|| self.shape.position(), |m| m.position)
    }

    /// Center of the collision shape.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.shape.with_position(self.position()).center()
    }

    /// Bounding box extents.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        let bounds = self.shape.bounds();
        Vec2::new(bounds.width, bounds.height)
    }

    /// Moves the collision shape to the current position.
    pub fn sync_shape(&mut self) {
        self.shape = self.shape.with_position(self.position());
    }

    /// Places the entity at `position`, resetting its motion.
    pub fn teleport(&mut self, position: Vec2) {
        if let Some(movement) = self.movement.as_mut() {
            *movement = MovementState {
                facing: movement.facing,
                ..MovementState::at(position)
            };
        }
        self.shape = self.shape.with_position(position);
    }

    /// Returns `true` while the entity takes part in the simulation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.destroyed && !self.collectible.is_some_and(|c| c.collected)
    }
}
