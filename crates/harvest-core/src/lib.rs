//! # Harvest Core
//!
//! Deterministic simulation core for the Harvest platformer.
//!
//! The crate moves entities over a [`tilegrid::TileGrid`] one fixed tick at a
//! time: the player from [`PlayerInput`], enemies from their AI [`Strategy`].
//! All ground movement goes through a single [`CollisionResolver`] that knows
//! about flat tiles, sloped ramps and non-collidable decoration.
//!
//! ## Architecture
//!
//! - **Roster**: entities keyed by a monotonic [`EntityId`], iterated in id order
//! - **Context**: per-tick read-only snapshot of the level (grid, tuning, sightings)
//! - **Resolvers**: tile collision, X axis then gravity then Y axis
//! - **Strategies**: patrol, chase, flight, plus the timed transition between them
//!
//! ## Usage
//!
//! ```
//! use harvest_core::{PlayerInput, Simulation, TuningConfig};
//!
//! let grid = tilegrid::load_grid(r#"{
//!     "width": 4, "height": 2, "tilewidth": 64,
//!     "layers": [{ "type": "tilelayer", "name": "ground", "data": [0, 0, 0, 0, 1, 1, 1, 1] }]
//! }"#).unwrap();
//!
//! let mut sim = Simulation::new(grid, TuningConfig::default(), 42);
//! sim.spawn_player_at_tile(1, 0, glam::Vec2::new(28.0, 48.0));
//! sim.step(&PlayerInput::walk(1.0)).unwrap();
//! assert_eq!(sim.tick(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod resolver;
pub mod roster;
pub mod save;
pub mod shape;
pub mod simulation;
pub mod strategy;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use config::{ResolverConfig, TuningConfig, FIXED_DT};
pub use context::{Sighting, SimulationContext};
pub use entity::{Direction, Entity, EntityId, EntityKind, MovementState};
pub use error::CoreError;
pub use events::TickEvents;
pub use input::PlayerInput;
pub use resolver::{CollisionResolver, Resolution};
pub use roster::EntityRoster;
pub use save::{SaveState, SavedEntity};
pub use shape::{Aabb, CollisionShape};
pub use simulation::Simulation;
pub use strategy::{Strategy, StrategyEngine, StrategyHistory, StrategyRecord};
