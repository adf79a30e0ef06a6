//! Ground strategies: patrol, chase and the transition pause between them.
//!
//! Ground movers always go through the collision resolver with gravity, so
//! they walk on ramps and fall off ledges exactly like the player.

use crate::context::SimulationContext;
use crate::entity::{AiState, Direction, MovementState};
use crate::error::CoreError;
use crate::resolver::Resolution;
use crate::shape::CollisionShape;

use super::Strategy;

pub(super) fn patrol(
    movement: &mut MovementState,
    ai: &mut AiState,
    shape: &CollisionShape,
    ctx: &SimulationContext<'_>,
) -> Resolution {
    let tuning = ctx.tuning();
    let now = ctx.now();

    let reverse_due = ai
        .history
        .last()
        .is_some_and(|record| now - record.last_action_time >= tuning.patrol_reverse_interval);
    if reverse_due {
        movement.facing = walking_direction(movement.facing).reversed_x();
        ai.history.touch(now);
    }
    movement.velocity.x = walking_direction(movement.facing).sign_x() * tuning.walk_speed;

    let resolution = ctx.resolver().resolve(movement, shape, tuning.gravity);

    let (low, high) = tuning.patrol_band;
    if movement.position.x < low {
        movement.position.x = low;
        movement.velocity.x = movement.velocity.x.abs();
        movement.facing = Direction::Right;
    } else if movement.position.x > high {
        movement.position.x = high;
        movement.velocity.x = -movement.velocity.x.abs();
        movement.facing = Direction::Left;
    }

    let center = shape.with_position(movement.position).center();
    if let Some((target, distance)) = ctx.controlled_within(center, tuning.detect_radius) {
        tracing::debug!(distance, "controlled entity spotted");
        ai.last_known_target = Some(target.center);
        ai.target_lost_at = None;
        ai.stage(Strategy::ChaseEnemy, now);
    }

    resolution
}

pub(super) fn chase(
    movement: &mut MovementState,
    ai: &mut AiState,
    shape: &CollisionShape,
    ctx: &SimulationContext<'_>,
) -> Resolution {
    let tuning = ctx.tuning();
    let now = ctx.now();
    let center = shape.with_position(movement.position).center();

    match ctx.nearest_controlled(center) {
        Some((target, distance)) if distance <= tuning.lose_radius => {
            ai.last_known_target = Some(target.center);
            ai.target_lost_at = None;
        }
        _ => {
            let lost_at = *ai.target_lost_at.get_or_insert(now);
            if now - lost_at > tuning.chase_memory
                && ai.time_in_strategy(now) >= tuning.min_chase_time
            {
                tracing::debug!(lost_for = now - lost_at, "target lost, returning to patrol");
                ai.target_lost_at = None;
                ai.last_known_target = None;
                ai.stage(Strategy::Patrol, now);
                movement.velocity.x = 0.0;
                return ctx.resolver().resolve(movement, shape, tuning.gravity);
            }
        }
    }

    let dx = ai.last_known_target.map_or(0.0, |target| target.x - center.x);
    movement.velocity.x = if dx.abs() < tuning.chase_speed {
        0.0
    } else {
        dx.signum() * tuning.chase_speed
    };

    ctx.resolver().resolve(movement, shape, tuning.gravity)
}

pub(super) fn transition(
    movement: &mut MovementState,
    ai: &mut AiState,
    shape: &CollisionShape,
    ctx: &SimulationContext<'_>,
) -> Result<Resolution, CoreError> {
    let tuning = ctx.tuning();
    let now = ctx.now();

    movement.velocity.x = 0.0;
    let resolution = ctx.resolver().resolve(movement, shape, tuning.gravity);

    if ai.time_in_strategy(now) < tuning.transition_duration {
        return Ok(resolution);
    }

    let target = ai.pending.take().ok_or_else(|| {
        CoreError::InvalidStrategy("transition expired with nothing staged".to_owned())
    })?;
    if target == Strategy::Transition {
        return Err(CoreError::InvalidStrategy(
            "transition staged to itself".to_owned(),
        ));
    }

    ai.enter(target, now);
    if target == Strategy::Patrol {
        movement.velocity.x = walking_direction(movement.facing).sign_x() * tuning.walk_speed;
    }
    Ok(resolution)
}

fn walking_direction(facing: Direction) -> Direction {
    match facing {
        Direction::Left => Direction::Left,
        Direction::Right | Direction::Up | Direction::Down => Direction::Right,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::config::TuningConfig;
    use crate::context::SimulationContext;
    use crate::entity::{EntityId, EntityKind};
    use crate::error::CoreError;
    use crate::roster::EntityRoster;
    use crate::strategy::{Strategy, StrategyEngine};
    use crate::tests::helpers::{grid_from_rows, wide_floor};

    const SIZE: Vec2 = Vec2::new(32.0, 32.0);

    /// Runs `ticks` AI ticks over `roster`, returning the final time.
    fn run_ai(
        roster: &mut EntityRoster,
        tuning: &TuningConfig,
        grid: &tilegrid::TileGrid,
        start: f32,
        ticks: usize,
    ) -> f32 {
        let mut engine = StrategyEngine::new(7);
        let mut now = start;
        for _ in 0..ticks {
            let ids: Vec<EntityId> = roster.ids().collect();
            for id in ids {
                let ctx = SimulationContext::new(grid, tuning, roster, now);
                let mut entity = roster.get(id).unwrap().clone();
                engine.advance(&mut entity, &ctx).unwrap();
                *roster.get_mut(id).unwrap() = entity;
            }
            now += tuning.dt;
        }
        now
    }

    // =========================================================================
    // Patrol
    // =========================================================================

    #[test]
    fn patrol_reverses_after_interval() {
        let grid = wide_floor(20, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(400.0, 96.0), SIZE, 0.0);

        run_ai(&mut roster, &tuning, &grid, 0.0, 60);
        let x_after_1s = roster.get(walker).unwrap().position().x;
        assert!(x_after_1s > 400.0);

        // Reversal at 3 s; by 5 s it has walked back for 2 s.
        run_ai(&mut roster, &tuning, &grid, 1.0, 240);
        let entity = roster.get(walker).unwrap();
        assert!(entity.movement.unwrap().velocity.x < 0.0);
        let history = &entity.ai.as_ref().unwrap().history;
        assert_eq!(history.len(), 1);
        assert!(history.last().unwrap().last_action_time >= 3.0 - 1e-3);
    }

    #[test]
    fn patrol_stays_inside_band() {
        let grid = wide_floor(20, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(690.0, 96.0), SIZE, 0.0);

        for chunk in 0..10 {
            run_ai(&mut roster, &tuning, &grid, chunk as f32, 60);
            let x = roster.get(walker).unwrap().position().x;
            assert!((100.0..=700.0).contains(&x), "x = {x}");
        }
    }

    #[test]
    fn patrol_spots_controlled_entity() {
        let grid = wide_floor(20, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(300.0, 96.0), SIZE, 0.0);
        roster.spawn(EntityKind::Player, Vec2::new(360.0, 96.0), SIZE, 0.0);

        run_ai(&mut roster, &tuning, &grid, 0.0, 1);
        let ai = roster.get(walker).unwrap().ai.clone().unwrap();
        assert_eq!(ai.strategy, Strategy::Transition);
        assert_eq!(ai.pending, Some(Strategy::ChaseEnemy));
        assert!(ai.last_known_target.is_some());
    }

    // =========================================================================
    // Transition
    // =========================================================================

    #[test]
    fn transition_holds_then_commits() {
        let grid = wide_floor(20, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(300.0, 96.0), SIZE, 0.0);
        roster
            .get_mut(walker)
            .unwrap()
            .ai
            .as_mut()
            .unwrap()
            .stage(Strategy::Patrol, 0.0);

        run_ai(&mut roster, &tuning, &grid, 0.0, 30);
        let entity = roster.get(walker).unwrap();
        assert_eq!(entity.ai.as_ref().unwrap().strategy, Strategy::Transition);
        assert!(entity.movement.unwrap().velocity.x.abs() < f32::EPSILON);

        run_ai(&mut roster, &tuning, &grid, 0.5, 32);
        let entity = roster.get(walker).unwrap();
        assert_eq!(entity.ai.as_ref().unwrap().strategy, Strategy::Patrol);
        assert!(entity.ai.as_ref().unwrap().pending.is_none());
    }

    #[test]
    fn transition_without_pending_is_invalid() {
        let grid = grid_from_rows(&["....", "####"]);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(10.0, 32.0), SIZE, 0.0);
        roster
            .get_mut(walker)
            .unwrap()
            .ai
            .as_mut()
            .unwrap()
            .enter(Strategy::Transition, 0.0);

        let ctx = SimulationContext::new(&grid, &tuning, &roster, 5.0);
        let mut entity = roster.get(walker).unwrap().clone();
        let result = StrategyEngine::new(0).advance(&mut entity, &ctx);
        assert!(matches!(result, Err(CoreError::InvalidStrategy(_))));
    }

    // =========================================================================
    // Chase
    // =========================================================================

    #[test]
    fn chase_moves_toward_target() {
        let grid = wide_floor(20, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(300.0, 96.0), SIZE, 0.0);
        roster.spawn(EntityKind::Player, Vec2::new(200.0, 96.0), SIZE, 0.0);
        roster
            .get_mut(walker)
            .unwrap()
            .ai
            .as_mut()
            .unwrap()
            .enter(Strategy::ChaseEnemy, 0.0);

        run_ai(&mut roster, &tuning, &grid, 0.0, 10);
        let entity = roster.get(walker).unwrap();
        assert!(entity.position().x < 300.0);
        assert!((entity.movement.unwrap().velocity.x + tuning.chase_speed).abs() < 1e-4);
    }

    #[test]
    fn chase_gives_up_after_grace_window() {
        let grid = wide_floor(30, 3);
        let tuning = TuningConfig::default();
        let mut roster = EntityRoster::new();
        let walker = roster.spawn(EntityKind::Walker, Vec2::new(300.0, 96.0), SIZE, 0.0);
        roster.spawn(EntityKind::Player, Vec2::new(1500.0, 96.0), SIZE, 0.0);
        roster
            .get_mut(walker)
            .unwrap()
            .ai
            .as_mut()
            .unwrap()
            .enter(Strategy::ChaseEnemy, 0.0);

        // Lost at t = 0; still chasing through t = 3.
        run_ai(&mut roster, &tuning, &grid, 0.0, 179);
        let ai = roster.get(walker).unwrap().ai.clone().unwrap();
        assert_eq!(ai.strategy, Strategy::ChaseEnemy);
        assert_eq!(ai.target_lost_at, Some(0.0));

        run_ai(&mut roster, &tuning, &grid, 179.0 * tuning.dt, 5);
        let ai = roster.get(walker).unwrap().ai.clone().unwrap();
        assert_eq!(ai.strategy, Strategy::Transition);
        assert_eq!(ai.pending, Some(Strategy::Patrol));
        let transitions = ai
            .history
            .records()
            .iter()
            .filter(|r| r.strategy == Strategy::Transition)
            .count();
        assert_eq!(transitions, 1);
    }
}
