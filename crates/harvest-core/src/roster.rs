//! Registry of the entities in the current level.
//!
//! The roster stores entities in a `BTreeMap` keyed by [`EntityId`]. Ids are
//! assigned monotonically, so iteration always runs in spawn order and two
//! runs with the same inputs touch entities in the same sequence.
//!
//! Membership only changes between ticks: spawning happens during level
//! setup, and destroyed entities are swept at the end of a tick by
//! [`EntityRoster::sweep_destroyed`].
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use harvest_core::entity::EntityKind;
//! use harvest_core::roster::EntityRoster;
//!
//! let mut roster = EntityRoster::new();
//! let player = roster.spawn(EntityKind::Player, Vec2::new(0.0, 0.0), Vec2::new(28.0, 48.0), 0.0);
//! let walker = roster.spawn(EntityKind::Walker, Vec2::new(90.0, 0.0), Vec2::new(32.0, 32.0), 0.0);
//!
//! let ids: Vec<_> = roster.ids().collect();
//! assert_eq!(ids, vec![player, walker]);
//! assert_eq!(roster.controlled(), Some(player));
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind};

/// Live entities of the level, iterated in id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRoster {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity of `kind` and returns its id.
    pub fn spawn(&mut self, kind: EntityKind, position: Vec2, size: Vec2, now: f32) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities
            .insert(id, Entity::new(id, kind, position, size, now));
        id
    }

    /// Removes an entity, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Removes every entity. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Drops entities flagged as destroyed and returns how many went.
    pub fn sweep_destroyed(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, entity| !entity.destroyed);
        before - self.entities.len()
    }

    /// Entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable entity by id.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Ids in spawn order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Entities in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Mutable entities in spawn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Ids of active entities of `kind`, in spawn order.
    pub fn ids_of(&self, kind: EntityKind) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .values()
            .filter(move |e| e.kind() == kind && e.is_active())
            .map(Entity::id)
    }

    /// First active controlled entity.
    #[must_use]
    pub fn controlled(&self) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.kind().is_controlled() && e.is_active())
            .map(Entity::id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the roster holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Id the next spawn will receive.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }
}
