//! Component structs carried by entities.
//!
//! An entity is a flat record; which of these components it carries decides
//! which systems touch it. Movers have a [`MovementState`], AI-driven movers an
//! [`AiState`], the player a [`Health`], crops a [`Collectible`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::strategy::{Strategy, StrategyHistory};

/// Cardinal direction, used for facing and for flying movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Toward negative Y.
    Up,
    /// Toward positive X.
    #[default]
    Right,
    /// Toward positive Y.
    Down,
    /// Toward negative X.
    Left,
}

impl Direction {
    /// Unit vector in world space (Y down).
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Next direction clockwise: Up, Right, Down, Left, Up.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Horizontal mirror; vertical directions are unchanged.
    #[must_use]
    pub const fn reversed_x(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            other => other,
        }
    }

    /// Sign of the horizontal component (`0.0` for vertical directions).
    #[must_use]
    pub const fn sign_x(self) -> f32 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
            Self::Up | Self::Down => 0.0,
        }
    }

    /// Direction of the dominant velocity component.
    ///
    /// Ties favour the horizontal axis; a zero vector yields `fallback`.
    #[must_use]
    pub fn dominant(velocity: Vec2, fallback: Self) -> Self {
        if velocity == Vec2::ZERO {
            fallback
        } else if velocity.x.abs() >= velocity.y.abs() {
            if velocity.x >= 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if velocity.y >= 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// Kinematic state of a moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementState {
    /// Top-left corner of the bounding box, world pixels.
    pub position: Vec2,
    /// Ground movers: pixels per tick. Flyers: pixels per second.
    pub velocity: Vec2,
    /// Resting exactly on a ground surface with no vertical velocity.
    pub is_on_ground: bool,
    /// Set by a jump, cleared on landing.
    pub is_jumping: bool,
    /// Landing target held while falling over a ramp; 0 when none.
    pub jump_diagonal_pos_y: f32,
    /// Facing, follows the sign of horizontal motion.
    pub facing: Direction,
}

impl MovementState {
    /// Resting state at `position`.
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Airborne: not resting on ground.
    #[must_use]
    pub const fn is_airborne(&self) -> bool {
        !self.is_on_ground
    }
}

/// Hit points and the damage cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Remaining hit points.
    pub current: i32,
    /// Starting hit points.
    pub max: i32,
    /// Seconds of invincibility left.
    pub invincible_for: f32,
}

impl Health {
    /// Full health, no invincibility.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            invincible_for: 0.0,
        }
    }

    /// Returns `true` while damage is ignored.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.invincible_for > 0.0
    }

    /// Applies damage unless invincible; returns whether it landed.
    pub fn take_hit(&mut self, damage: i32, invincibility: f32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.current = (self.current - damage).max(0);
        self.invincible_for = invincibility;
        true
    }

    /// Counts the invincibility window down.
    pub fn tick(&mut self, dt: f32) {
        self.invincible_for = (self.invincible_for - dt).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Pickup state of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collectible {
    /// Terminal once set.
    pub collected: bool,
}

/// Decision state of an AI-driven entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    /// Current strategy.
    pub strategy: Strategy,
    /// Clock time the current strategy was entered.
    pub entered_at: f32,
    /// Append-only record of strategy changes.
    pub history: StrategyHistory,
    /// Strategy staged to follow the current `Transition`.
    pub pending: Option<Strategy>,
    /// Where the chased entity was last seen.
    pub last_known_target: Option<Vec2>,
    /// When the chased entity dropped out of range.
    pub target_lost_at: Option<f32>,
    /// Current flying direction.
    pub direction: Direction,
    /// Time of the next flying direction change.
    pub next_turn_at: f32,
    /// Flying speed multiplier.
    pub agility: f32,
}

impl AiState {
    /// Starts in `strategy` at time `now`, with its first history record.
    #[must_use]
    pub fn new(strategy: Strategy, now: f32) -> Self {
        let mut history = StrategyHistory::default();
        history.record(strategy, now);
        Self {
            strategy,
            entered_at: now,
            history,
            pending: None,
            last_known_target: None,
            target_lost_at: None,
            direction: Direction::Right,
            next_turn_at: now,
            agility: 1.0,
        }
    }

    /// Switches to `strategy`, appending a history record only on change.
    ///
    /// Returns `true` if the strategy changed.
    pub fn enter(&mut self, strategy: Strategy, now: f32) -> bool {
        if self.strategy == strategy {
            return false;
        }
        tracing::debug!(from = %self.strategy, to = %strategy, at = now, "strategy change");
        self.strategy = strategy;
        self.entered_at = now;
        self.history.record(strategy, now);
        true
    }

    /// Resumes in `strategy` on a clock set back to `now` by a save restore.
    ///
    /// Anything staged or remembered is dropped and the timers restart from
    /// `now`; history records already written are kept.
    pub fn resume(&mut self, strategy: Strategy, now: f32) {
        self.pending = None;
        self.target_lost_at = None;
        self.enter(strategy, now);
        self.entered_at = now;
        self.history.rewind(now);
    }

    /// Enters `Transition` with `target` staged to follow it.
    pub fn stage(&mut self, target: Strategy, now: f32) {
        self.pending = Some(target);
        self.enter(Strategy::Transition, now);
    }

    /// Seconds spent in the current strategy.
    #[must_use]
    pub fn time_in_strategy(&self, now: f32) -> f32 {
        now - self.entered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_cycle_covers_all_four() {
        let mut d = Direction::Up;
        let mut seen = vec![d];
        for _ in 0..3 {
            d = d.clockwise();
            seen.push(d);
        }
        assert_eq!(
            seen,
            vec![Direction::Up, Direction::Right, Direction::Down, Direction::Left]
        );
        assert_eq!(d.clockwise(), Direction::Up);
    }

    #[test]
    fn dominant_direction_from_velocity() {
        assert_eq!(Direction::dominant(Vec2::new(3.0, -1.0), Direction::Up), Direction::Right);
        assert_eq!(Direction::dominant(Vec2::new(-1.0, -3.0), Direction::Left), Direction::Up);
        assert_eq!(Direction::dominant(Vec2::ZERO, Direction::Left), Direction::Left);
    }

    #[test]
    fn health_respects_invincibility() {
        let mut health = Health::new(3);
        assert!(health.take_hit(1, 1.5));
        assert!(!health.take_hit(1, 1.5));
        assert_eq!(health.current, 2);

        health.tick(1.0);
        assert!(health.is_invincible());
        health.tick(0.6);
        assert!(!health.is_invincible());
        assert!(health.take_hit(5, 1.5));
        assert_eq!(health.current, 0);
    }

    #[test]
    fn resume_restarts_timers_without_reordering_history() {
        let mut ai = AiState::new(Strategy::Patrol, 0.0);
        ai.stage(Strategy::ChaseEnemy, 0.5);
        ai.enter(Strategy::ChaseEnemy, 1.5);
        ai.history.touch(2.0);

        ai.resume(Strategy::Patrol, 0.5);
        assert_eq!(ai.strategy, Strategy::Patrol);
        assert!(ai.pending.is_none());
        assert!(ai.time_in_strategy(0.5).abs() < f32::EPSILON);

        let records = ai.history.records();
        assert_eq!(records.len(), 4);
        assert!(records.windows(2).all(|w| w[0].start_time <= w[1].start_time));
        assert!((records[3].last_action_time - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn entering_same_strategy_is_idempotent() {
        let mut ai = AiState::new(Strategy::Patrol, 0.0);
        assert!(!ai.enter(Strategy::Patrol, 1.0));
        assert_eq!(ai.history.len(), 1);

        assert!(ai.enter(Strategy::ChaseEnemy, 2.0));
        assert_eq!(ai.history.len(), 2);
        assert!((ai.time_in_strategy(5.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn stage_goes_through_transition() {
        let mut ai = AiState::new(Strategy::Patrol, 0.0);
        ai.stage(Strategy::ChaseEnemy, 1.0);
        assert_eq!(ai.strategy, Strategy::Transition);
        assert_eq!(ai.pending, Some(Strategy::ChaseEnemy));
    }
}
