//! Flying strategies.
//!
//! Flyers ignore gravity and tile collision. Velocity is in pixels per second
//! and integrated with the tick length.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::context::SimulationContext;
use crate::entity::{AiState, Direction, MovementState};
use crate::resolver::Resolution;
use crate::shape::CollisionShape;

/// Cardinal flight: turn clockwise whenever the current leg runs out.
pub(super) fn cardinal(
    movement: &mut MovementState,
    ai: &mut AiState,
    shape: &CollisionShape,
    ctx: &SimulationContext<'_>,
    rng: &mut ChaCha8Rng,
) -> Resolution {
    let tuning = ctx.tuning();
    let now = ctx.now();

    if now >= ai.next_turn_at {
        ai.direction = ai.direction.clockwise();
        ai.next_turn_at = now + leg_length(rng, tuning.flight_interval);
        ai.history.touch(now);
    }

    movement.velocity = ai.direction.unit() * tuning.flying_speed * ai.agility;
    movement.position += movement.velocity * ctx.dt();
    movement.facing = ai.direction;

    let (min, max) = map_span(shape, ctx);
    movement.position = movement.position.clamp(min, max);
    Resolution::default()
}

/// Free flight: random heading, bouncing off the map edges and the ground.
pub(super) fn free(
    movement: &mut MovementState,
    ai: &mut AiState,
    shape: &CollisionShape,
    ctx: &SimulationContext<'_>,
    rng: &mut ChaCha8Rng,
) -> Resolution {
    let tuning = ctx.tuning();
    let now = ctx.now();

    if now >= ai.next_turn_at {
        let angle = rng.gen_range(0.0..TAU);
        movement.velocity = Vec2::new(angle.cos(), angle.sin()) * tuning.flying_speed;
        ai.next_turn_at = now + leg_length(rng, tuning.flight_interval);
        ai.history.touch(now);
    }

    movement.position += movement.velocity * ctx.dt();

    let (min, max) = map_span(shape, ctx);
    let mut landed = false;
    if movement.position.x < min.x {
        movement.position.x = min.x;
        movement.velocity.x = movement.velocity.x.abs();
    } else if movement.position.x > max.x {
        movement.position.x = max.x;
        movement.velocity.x = -movement.velocity.x.abs();
    }
    if movement.position.y < min.y {
        movement.position.y = min.y;
        movement.velocity.y = movement.velocity.y.abs();
    } else if movement.position.y > max.y {
        movement.position.y = max.y;
        movement.velocity.y = -movement.velocity.y.abs();
    }

    let bounds = shape.bounds();
    let size = Vec2::new(bounds.width, bounds.height);
    if let Some(ground) = ctx.resolver().support_under(movement.position, size) {
        if movement.position.y + size.y > ground.y {
            movement.position.y = ground.y - size.y;
            movement.velocity.y = -movement.velocity.y.abs();
            landed = true;
        }
    }

    ai.direction = Direction::dominant(movement.velocity, ai.direction);
    movement.facing = ai.direction;
    Resolution {
        landed,
        ..Resolution::default()
    }
}

fn leg_length(rng: &mut ChaCha8Rng, (low, high): (f32, f32)) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Range of valid top-left positions inside the map.
fn map_span(shape: &CollisionShape, ctx: &SimulationContext<'_>) -> (Vec2, Vec2) {
    let bounds = shape.bounds();
    let grid = ctx.grid();
    let max = Vec2::new(
        (grid.pixel_width() - bounds.width).max(0.0),
        (grid.pixel_height() - bounds.height).max(0.0),
    );
    (Vec2::ZERO, max)
}
