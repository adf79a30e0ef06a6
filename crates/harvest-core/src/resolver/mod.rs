//! Tile collision resolution.
//!
//! [`CollisionResolver`] moves one entity per call through the tile grid,
//! one axis at a time:
//!
//! 1. **X**: probe `position + (vx, 0)`. Flat tiles stop the move; ramps let
//!    it through, after which a grounded entity is snapped onto the ramp.
//! 2. **Gravity** is added to `vy`.
//! 3. **Y**: rising commits directly (there is no ceiling collision). Falling
//!    lands on the combined ground under the entity once the feet reach it;
//!    a grounded entity stays on the highest surface under its edges.
//! 4. **Bounds**: X is clamped into the map and `vx` to twice the move speed.
//!
//! The entity's authoritative shape is never moved here. Probes work on
//! translated copies, and the caller syncs the shape from the returned state.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use harvest_core::config::TuningConfig;
//! use harvest_core::entity::MovementState;
//! use harvest_core::resolver::CollisionResolver;
//! use harvest_core::shape::CollisionShape;
//! use tilegrid::{Layer, TileGrid};
//! use std::collections::HashMap;
//!
//! // Four tiles wide, floor on the second row.
//! let tiles = vec![0, 0, 0, 0, 1, 1, 1, 1];
//! let grid = TileGrid::new(4, 2, 64, vec![Layer::new("ground", tiles)], HashMap::new()).unwrap();
//! let tuning = TuningConfig::default();
//! let resolver = CollisionResolver::new(&grid, &tuning);
//!
//! let shape = CollisionShape::rectangle(Vec2::ZERO, Vec2::splat(32.0));
//! let mut movement = MovementState::at(Vec2::ZERO);
//! for _ in 0..120 {
//!     resolver.resolve(&mut movement, &shape, tuning.gravity);
//! }
//! assert!(movement.is_on_ground);
//! assert_eq!(movement.position.y, 32.0);
//! ```

mod probe;

pub use probe::{
    candidate_range, ground_under, ground_y_at, probe, support_under, GroundHit, TileHit,
};

use glam::Vec2;
use tilegrid::TileGrid;

use crate::config::{ResolverConfig, TuningConfig};
use crate::entity::{Direction, MovementState};
use crate::shape::CollisionShape;

/// What happened during one resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// A flat tile blocked horizontal motion.
    pub collided_x: bool,
    /// The entity came to rest on ground this step.
    pub landed: bool,
    /// The entity was snapped onto a ramp after a horizontal move.
    pub slope_followed: bool,
}

/// Moves entities through a [`TileGrid`].
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver<'a> {
    grid: &'a TileGrid,
    config: ResolverConfig,
    speed_limit: f32,
}

impl<'a> CollisionResolver<'a> {
    /// Creates a resolver over `grid` using the resolver and speed tuning.
    #[must_use]
    pub fn new(grid: &'a TileGrid, tuning: &TuningConfig) -> Self {
        Self {
            grid,
            config: tuning.resolver,
            speed_limit: 2.0 * tuning.move_speed,
        }
    }

    /// Grid being resolved against.
    #[must_use]
    pub const fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    /// Resolver tuning.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// First collidable tile `shape` would overlap at `position`.
    #[must_use]
    pub fn collides_at(&self, shape: &CollisionShape, position: Vec2) -> Option<TileHit> {
        probe(self.grid, &self.config, &shape.with_position(position))
    }

    /// Combined ground under a bounding box at `position`.
    #[must_use]
    pub fn ground_under(&self, position: Vec2, size: Vec2) -> Option<GroundHit> {
        ground_under(self.grid, &self.config, position, size)
    }

    /// Highest surface under either edge of a bounding box at `position`.
    #[must_use]
    pub fn support_under(&self, position: Vec2, size: Vec2) -> Option<GroundHit> {
        support_under(self.grid, &self.config, position, size)
    }

    /// Runs one full step: X axis, gravity, Y axis, map bounds.
    pub fn resolve(
        &self,
        movement: &mut MovementState,
        shape: &CollisionShape,
        gravity: f32,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        self.resolve_x(movement, shape, &mut resolution);
        movement.velocity.y += gravity;
        self.resolve_y(movement, shape, &mut resolution);
        self.clamp_to_map(movement, shape);
        resolution
    }

    /// Horizontal half of a step.
    pub fn resolve_x(
        &self,
        movement: &mut MovementState,
        shape: &CollisionShape,
        resolution: &mut Resolution,
    ) {
        let vx = movement.velocity.x;
        if vx == 0.0 {
            return;
        }
        movement.facing = if vx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        };

        let size = extents(shape);
        let was_on_ramp = movement.is_on_ground
            && self
                .support_under(movement.position, size)
                .is_some_and(|g| g.diagonal);

        let proposed = movement.position + Vec2::new(vx, 0.0);
        if let Some(hit) = self.collides_at(shape, proposed) {
            if !hit.diagonal {
                movement.velocity.x = 0.0;
                resolution.collided_x = true;
                return;
            }
        }
        movement.position.x = proposed.x;

        if !movement.is_on_ground || movement.velocity.y != 0.0 {
            return;
        }
        let Some(ground) = self.support_under(movement.position, size) else {
            return;
        };
        let feet = movement.position.y + size.y;
        if (ground.diagonal || was_on_ramp) && (ground.y - feet).abs() <= self.config.max_step {
            movement.position.y = ground.y - size.y;
            resolution.slope_followed = true;
            tracing::trace!(y = movement.position.y, "slope follow");
        }
    }

    /// Vertical half of a step.
    pub fn resolve_y(
        &self,
        movement: &mut MovementState,
        shape: &CollisionShape,
        resolution: &mut Resolution,
    ) {
        let vy = movement.velocity.y;
        if vy == 0.0 {
            return;
        }
        let proposed = movement.position + Vec2::new(0.0, vy);
        if vy < 0.0 {
            movement.position = proposed;
            movement.is_on_ground = false;
            return;
        }

        let size = extents(shape);
        let ground = if movement.is_on_ground {
            self.support_under(movement.position, size)
        } else {
            self.ground_under(movement.position, size)
        };
        let Some(ground) = ground else {
            if self.collides_at(shape, proposed).is_some() {
                movement.velocity.y = 0.0;
            } else {
                movement.position = proposed;
                movement.is_on_ground = false;
            }
            return;
        };

        let mut target = ground.y - size.y;
        if ground.diagonal && movement.is_airborne() {
            let held = movement.jump_diagonal_pos_y;
            let rise = held - target;
            if held != 0.0
                && rise > self.config.diagonal_snap_tolerance
                && rise <= self.config.seam_threshold
            {
                target = held;
            }
            movement.jump_diagonal_pos_y = target;
        }

        if proposed.y >= target {
            let was_airborne = movement.is_airborne();
            movement.position.y = target;
            movement.velocity.y = 0.0;
            movement.is_on_ground = true;
            movement.is_jumping = false;
            movement.jump_diagonal_pos_y = 0.0;
            if was_airborne {
                resolution.landed = true;
                tracing::trace!(y = target, diagonal = ground.diagonal, "landed");
            }
        } else {
            movement.position = proposed;
            movement.is_on_ground = false;
        }
    }

    /// Keeps the bounding box inside the map horizontally and caps `vx`.
    pub fn clamp_to_map(&self, movement: &mut MovementState, shape: &CollisionShape) {
        let max_x = (self.grid.pixel_width() - extents(shape).x).max(0.0);
        movement.position.x = movement.position.x.clamp(0.0, max_x);
        movement.velocity.x = movement
            .velocity
            .x
            .clamp(-self.speed_limit, self.speed_limit);
    }
}

fn extents(shape: &CollisionShape) -> Vec2 {
    let bounds = shape.bounds();
    Vec2::new(bounds.width, bounds.height)
}
