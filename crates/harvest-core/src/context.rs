//! Read-only view of the level handed to the strategy engine.
//!
//! [`SimulationContext`] is built once per tick, after the player has moved
//! and before any AI entity is advanced. It carries the grid, the tuning, the
//! elapsed time, and a snapshot of every active entity's position. AI entities
//! mutate only themselves; everything they know about the others comes from
//! this snapshot, so evaluation order does not leak between them within a tick.

use glam::Vec2;
use tilegrid::TileGrid;

use crate::config::TuningConfig;
use crate::entity::{Entity, EntityId, EntityKind};
use crate::resolver::CollisionResolver;
use crate::roster::EntityRoster;

/// Where an entity was at the start of the AI phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Top-left corner of the bounding box.
    pub position: Vec2,
    /// Center of the collision shape.
    pub center: Vec2,
}

impl Sighting {
    fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            kind: entity.kind(),
            position: entity.position(),
            center: entity.center(),
        }
    }
}

/// Per-tick snapshot shared by every strategy evaluation.
#[derive(Debug)]
pub struct SimulationContext<'a> {
    grid: &'a TileGrid,
    tuning: &'a TuningConfig,
    elapsed: f32,
    sightings: Vec<Sighting>,
}

impl<'a> SimulationContext<'a> {
    /// Snapshots the active entities of `roster`.
    #[must_use]
    pub fn new(
        grid: &'a TileGrid,
        tuning: &'a TuningConfig,
        roster: &EntityRoster,
        elapsed: f32,
    ) -> Self {
        let sightings = roster
            .iter()
            .filter(|e| e.is_active())
            .map(Sighting::of)
            .collect();
        Self {
            grid,
            tuning,
            elapsed,
            sightings,
        }
    }

    /// Tile grid of the level.
    #[must_use]
    pub const fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &'a TuningConfig {
        self.tuning
    }

    /// Simulation time in seconds at the start of this tick.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.elapsed
    }

    /// Seconds per tick.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.tuning.dt
    }

    /// Resolver over this level's grid.
    #[must_use]
    pub fn resolver(&self) -> CollisionResolver<'a> {
        CollisionResolver::new(self.grid, self.tuning)
    }

    /// All sightings, in id order.
    #[must_use]
    pub fn sightings(&self) -> &[Sighting] {
        &self.sightings
    }

    /// Nearest controlled entity to `from`, measured between centers.
    ///
    /// Returns the sighting and its distance. Exact ties go to the lower id.
    #[must_use]
    pub fn nearest_controlled(&self, from: Vec2) -> Option<(Sighting, f32)> {
        let mut best: Option<(Sighting, f32)> = None;
        for sighting in self.sightings.iter().filter(|s| s.kind.is_controlled()) {
            let distance = from.distance(sighting.center);
            if !best.is_some_and(|(_, d)| distance >= d) {
                best = Some((*sighting, distance));
            }
        }
        best
    }

    /// Nearest controlled entity within `radius` of `from`.
    #[must_use]
    pub fn controlled_within(&self, from: Vec2, radius: f32) -> Option<(Sighting, f32)> {
        self.nearest_controlled(from)
            .filter(|(_, distance)| *distance <= radius)
    }
}
