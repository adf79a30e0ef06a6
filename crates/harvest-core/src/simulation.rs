//! The per-tick orchestration of a level.
//!
//! One call to [`Simulation::step`] advances the level by one fixed tick:
//!
//! 1. **Player**: input becomes velocity, a jump starts if grounded, and an
//!    optional dig removes the tile under the feet.
//! 2. **Player physics**: gravity and collision resolution.
//! 3. **Snapshot**: a [`SimulationContext`] is built from the roster.
//! 4. **AI**: every AI entity is advanced by the [`StrategyEngine`] in id order.
//! 5. **Contacts**: stomps, enemy hits and crop pickups.
//! 6. **Clock**: invincibility counts down, elapsed time and tick advance, and
//!    destroyed entities leave the roster.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use harvest_core::config::TuningConfig;
//! use harvest_core::input::PlayerInput;
//! use harvest_core::simulation::Simulation;
//!
//! let map = r#"{
//!     "width": 4, "height": 2, "tilewidth": 64,
//!     "layers": [{ "type": "tilelayer", "name": "ground", "data": [0,0,0,0, 1,1,1,1] }]
//! }"#;
//! let grid = tilegrid::load_grid(map).unwrap();
//! let mut sim = Simulation::new(grid, TuningConfig::default(), 42);
//! let player = sim.spawn_player_at_tile(0, 0, Vec2::new(28.0, 48.0));
//!
//! for _ in 0..60 {
//!     sim.step(&PlayerInput::IDLE).unwrap();
//! }
//!
//! let movement = sim.roster().get(player).unwrap().movement.unwrap();
//! assert!(movement.is_on_ground);
//! assert_eq!(sim.tick(), 60);
//! ```

use std::collections::BTreeSet;

use glam::Vec2;
use tilegrid::TileGrid;

use crate::config::TuningConfig;
use crate::context::SimulationContext;
use crate::entity::{EntityId, EntityKind};
use crate::error::CoreError;
use crate::events::TickEvents;
use crate::input::PlayerInput;
use crate::resolver::CollisionResolver;
use crate::roster::EntityRoster;
use crate::save::{SaveState, SavedEntity};
use crate::shape::CollisionShape;
use crate::strategy::StrategyEngine;

/// A running level.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: TileGrid,
    tuning: TuningConfig,
    roster: EntityRoster,
    engine: StrategyEngine,
    seed: u64,
    elapsed: f32,
    tick: u64,
    crops_remaining: u32,
    player: Option<EntityId>,
}

impl Simulation {
    /// Creates an empty level over `grid`.
    #[must_use]
    pub fn new(grid: TileGrid, tuning: TuningConfig, seed: u64) -> Self {
        Self {
            grid,
            tuning,
            roster: EntityRoster::new(),
            engine: StrategyEngine::new(seed),
            seed,
            elapsed: 0.0,
            tick: 0,
            crops_remaining: 0,
            player: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Level tile grid.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    /// Entities of the level.
    #[must_use]
    pub const fn roster(&self) -> &EntityRoster {
        &self.roster
    }

    /// Mutable roster, for level setup.
    #[must_use]
    pub fn roster_mut(&mut self) -> &mut EntityRoster {
        &mut self.roster
    }

    /// Seed of the strategy engine.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated seconds since the level started.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Ticks since the level started.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Crops still to collect.
    #[must_use]
    pub const fn crops_remaining(&self) -> u32 {
        self.crops_remaining
    }

    /// The player entity, once spawned.
    #[must_use]
    pub const fn player(&self) -> Option<EntityId> {
        self.player
    }

    // =========================================================================
    // Level setup
    // =========================================================================

    /// Removes every entity and restarts the level clock.
    pub fn reset_level(&mut self) {
        tracing::debug!(entities = self.roster.len(), tick = self.tick, "level reset");
        self.roster.clear();
        self.player = None;
        self.crops_remaining = 0;
        self.elapsed = 0.0;
        self.tick = 0;
    }

    /// Spawns an entity standing in tile `(tile_x, tile_y)`.
    ///
    /// The box is centered horizontally in the tile and its bottom rests on
    /// the tile's bottom edge. Crops add to the remaining count.
    pub fn spawn_at_tile(&mut self, kind: EntityKind, tile_x: i32, tile_y: i32, size: Vec2) -> EntityId {
        let origin = self.grid.tile_to_world(tile_x, tile_y);
        #[allow(clippy::cast_precision_loss)]
        let tile = self.grid.tile_size() as f32;
        let position = origin + Vec2::new((tile - size.x) * 0.5, tile - size.y);

        let id = self.roster.spawn(kind, position, size, self.elapsed);
        match kind {
            EntityKind::Crop => self.crops_remaining += 1,
            EntityKind::Player => {
                self.player.get_or_insert(id);
            }
            EntityKind::Walker | EntityKind::Flyer => {}
        }
        tracing::debug!(%id, %kind, x = position.x, y = position.y, "spawned");
        id
    }

    /// Spawns the player in a tile.
    pub fn spawn_player_at_tile(&mut self, tile_x: i32, tile_y: i32, size: Vec2) -> EntityId {
        self.spawn_at_tile(EntityKind::Player, tile_x, tile_y, size)
    }

    /// Spawns a patrolling ground enemy in a tile.
    pub fn spawn_walker_at_tile(&mut self, tile_x: i32, tile_y: i32, size: Vec2) -> EntityId {
        self.spawn_at_tile(EntityKind::Walker, tile_x, tile_y, size)
    }

    /// Spawns a flying enemy in a tile.
    pub fn spawn_flyer_at_tile(&mut self, tile_x: i32, tile_y: i32, size: Vec2) -> EntityId {
        self.spawn_at_tile(EntityKind::Flyer, tile_x, tile_y, size)
    }

    /// Spawns a crop in a tile.
    pub fn spawn_crop_at_tile(&mut self, tile_x: i32, tile_y: i32, size: Vec2) -> EntityId {
        self.spawn_at_tile(EntityKind::Crop, tile_x, tile_y, size)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the level by one tick.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownEntity`] if the player id went stale, and
    /// [`CoreError::InvalidStrategy`] from any AI entity in a broken state.
    pub fn step(&mut self, input: &PlayerInput) -> Result<TickEvents, CoreError> {
        let mut events = TickEvents::empty();

        if let Some(player) = self.player {
            if input.break_block {
                self.dig_under(player)?;
            }
            events |= self.move_player(player, input)?;
        }

        let ctx = SimulationContext::new(&self.grid, &self.tuning, &self.roster, self.elapsed);
        for entity in self.roster.iter_mut() {
            if entity.kind().is_ai() {
                self.engine.advance(entity, &ctx)?;
            }
        }

        if let Some(player) = self.player {
            events |= self.resolve_contacts(player)?;
        }

        let dt = self.tuning.dt;
        for entity in self.roster.iter_mut() {
            if let Some(health) = entity.health.as_mut() {
                health.tick(dt);
            }
        }
        self.roster.sweep_destroyed();
        self.elapsed += dt;
        self.tick += 1;

        Ok(events)
    }

    fn move_player(&mut self, id: EntityId, input: &PlayerInput) -> Result<TickEvents, CoreError> {
        let tuning = &self.tuning;
        let entity = self.roster.get_mut(id).ok_or(CoreError::UnknownEntity(id))?;
        if !entity.is_active() {
            return Ok(TickEvents::empty());
        }
        let shape = entity.shape;
        let Some(movement) = entity.movement.as_mut() else {
            return Ok(TickEvents::empty());
        };

        let mut events = TickEvents::empty();
        let speed = if input.sprint {
            tuning.move_speed * tuning.sprint_multiplier
        } else {
            tuning.move_speed
        };
        movement.velocity.x = input.axis() * speed;
        if input.wants_jump && movement.is_on_ground {
            movement.velocity.y = -tuning.jump_speed;
            movement.is_jumping = true;
            events |= TickEvents::JUMPED;
        }

        let start_x = movement.position.x;
        CollisionResolver::new(&self.grid, tuning).resolve(movement, &shape, tuning.gravity);
        if (movement.position.x - start_x).abs() > f32::EPSILON {
            events |= TickEvents::MOVED;
        }

        entity.sync_shape();
        Ok(events)
    }

    /// Removes the first collidable tile directly under the player's feet.
    fn dig_under(&mut self, id: EntityId) -> Result<(), CoreError> {
        let entity = self.roster.get(id).ok_or(CoreError::UnknownEntity(id))?;
        if !entity.movement.is_some_and(|m| m.is_on_ground) {
            return Ok(());
        }
        let bounds = entity.shape.bounds();
        let (x, y) = self
            .grid
            .world_to_tile(Vec2::new(bounds.center().x, bounds.bottom() + 1.0));

        let Ok(x_u) = u32::try_from(x) else {
            return Ok(());
        };
        let Ok(y_u) = u32::try_from(y) else {
            return Ok(());
        };
        let target = self
            .grid
            .stack_at(x_u, y_u)
            .find(|(_, tile)| self.grid.tile_class(*tile).collidable);
        if let Some((layer, tile)) = target {
            tracing::debug!(x, y, layer, tile, "tile dug out");
            self.grid.modify_tile(layer, x, y, 0);
        }
        Ok(())
    }

    fn resolve_contacts(&mut self, id: EntityId) -> Result<TickEvents, CoreError> {
        let player = self.roster.get(id).ok_or(CoreError::UnknownEntity(id))?;
        if !player.is_active() {
            return Ok(TickEvents::empty());
        }
        let player_shape: CollisionShape = player.shape;
        let falling = player.movement.is_some_and(|m| m.velocity.y >= 0.0);
        let player_bottom = player_shape.bounds().bottom();

        let mut events = TickEvents::empty();
        let mut stomped = false;
        let mut hit = false;
        for entity in self.roster.iter_mut() {
            if entity.id() == id || !entity.is_active() || !player_shape.collides_with(&entity.shape) {
                continue;
            }
            match entity.kind() {
                EntityKind::Walker | EntityKind::Flyer => {
                    if falling && player_bottom <= entity.shape.bounds().center().y {
                        tracing::debug!(enemy = %entity.id(), "stomped");
                        entity.destroyed = true;
                        stomped = true;
                    } else {
                        hit = true;
                    }
                }
                EntityKind::Crop => {
                    if let Some(collectible) = entity.collectible.as_mut() {
                        collectible.collected = true;
                        self.crops_remaining = self.crops_remaining.saturating_sub(1);
                        events |= TickEvents::COLLECTED;
                        if self.crops_remaining == 0 {
                            events |= TickEvents::LEVEL_CLEARED;
                        }
                    }
                }
                EntityKind::Player => {}
            }
        }

        let tuning = &self.tuning;
        let player = self.roster.get_mut(id).ok_or(CoreError::UnknownEntity(id))?;
        if stomped {
            if let Some(movement) = player.movement.as_mut() {
                movement.velocity.y = -tuning.stomp_bounce;
                movement.is_on_ground = false;
                movement.is_jumping = true;
            }
            events |= TickEvents::STOMPED;
        } else if hit {
            let landed = player
                .health
                .as_mut()
                .is_some_and(|h| h.take_hit(1, tuning.invincibility_duration));
            if landed {
                tracing::debug!(health = player.health.map_or(0, |h| h.current), "player hit");
                events |= TickEvents::HIT_ENEMY;
            }
        }
        Ok(events)
    }

    // =========================================================================
    // Save / restore
    // =========================================================================

    /// Captures the level state.
    #[must_use]
    pub fn snapshot(&self) -> SaveState {
        SaveState {
            elapsed: self.elapsed,
            crops_remaining: self.crops_remaining,
            entities: self.roster.iter().map(SavedEntity::capture).collect(),
        }
    }

    /// Applies a save taken from the same level.
    ///
    /// Entities missing from the save are removed. Nothing is changed if the
    /// save does not fit the roster.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownEntity`] for ids that are not in the roster or
    /// whose kind differs, and [`CoreError::InvalidStrategy`] for bad
    /// strategy codes.
    pub fn restore(&mut self, save: &SaveState) -> Result<(), CoreError> {
        let mut strategies = Vec::with_capacity(save.entities.len());
        for saved in &save.entities {
            let entity = self
                .roster
                .get(saved.id)
                .filter(|e| e.kind() == saved.kind)
                .ok_or(CoreError::UnknownEntity(saved.id))?;
            let strategy = saved.decoded_strategy()?;
            if strategy.is_some() != entity.ai.is_some() {
                return Err(CoreError::InvalidStrategy(format!(
                    "entity {} strategy does not match its kind",
                    saved.id
                )));
            }
            strategies.push(strategy);
        }

        let kept: BTreeSet<EntityId> = save.entities.iter().map(|s| s.id).collect();
        for entity in self.roster.iter_mut() {
            entity.destroyed = !kept.contains(&entity.id());
        }
        self.roster.sweep_destroyed();

        for (saved, strategy) in save.entities.iter().zip(strategies) {
            let Some(entity) = self.roster.get_mut(saved.id) else {
                continue;
            };
            entity.teleport(saved.position);
            if let (Some(health), Some(current)) = (entity.health.as_mut(), saved.health) {
                health.current = current.clamp(0, health.max);
                health.invincible_for = 0.0;
            }
            if let (Some(ai), Some(strategy)) = (entity.ai.as_mut(), strategy) {
                ai.resume(strategy, save.elapsed);
            }
            if let Some(collectible) = entity.collectible.as_mut() {
                collectible.collected = saved.collected;
            }
        }

        if self.player.is_some_and(|p| !kept.contains(&p)) {
            self.player = None;
        }
        self.elapsed = save.elapsed;
        self.crops_remaining = save.crops_remaining;
        tracing::debug!(entities = save.entities.len(), elapsed = save.elapsed, "save restored");
        Ok(())
    }
}
