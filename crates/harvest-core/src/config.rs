//! Tuning parameters.
//!
//! Every constant the resolver and the strategy engine act on lives here so a
//! level can ship its own tuning file. Missing fields take the defaults below.
//!
//! Units: ground movement (`move_speed`, `gravity`, `jump_speed`, walk and
//! chase speeds) is in pixels per tick; flying speed is in pixels per second;
//! durations are in seconds.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Fixed simulation timestep (1/60 second).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Collision resolver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Inset applied to every side of a tile rectangle before overlap tests,
    /// so touching a tile is not reported as penetrating it.
    pub tile_margin: f32,
    /// Left/right ground probes further apart than this straddle a slope seam;
    /// the far one is ignored.
    pub seam_threshold: f32,
    /// Landing targets over a ramp that rise by less than this are taken as-is.
    pub diagonal_snap_tolerance: f32,
    /// Highest surface above the feet the ground probe will step onto.
    pub max_step: f32,
    /// Horizontal inset of the edge ground probes.
    pub probe_inset: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tile_margin: 5.0,
            seam_threshold: 64.0,
            diagonal_snap_tolerance: 2.0,
            max_step: 64.0,
            probe_inset: 6.0,
        }
    }
}

/// Movement and behavior tuning shared by the player and AI entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Seconds per tick.
    pub dt: f32,
    /// Downward acceleration per tick.
    pub gravity: f32,
    /// Player horizontal speed per tick; horizontal velocity is clamped to twice this.
    pub move_speed: f32,
    /// Speed multiplier while sprinting.
    pub sprint_multiplier: f32,
    /// Initial upward speed of a jump.
    pub jump_speed: f32,
    /// Upward speed after stomping an enemy.
    pub stomp_bounce: f32,
    /// Patrol speed of ground AI.
    pub walk_speed: f32,
    /// Chase speed of ground AI.
    pub chase_speed: f32,
    /// Horizontal band patrolling entities stay inside.
    pub patrol_band: (f32, f32),
    /// Patrol reverses direction after this long.
    pub patrol_reverse_interval: f32,
    /// Patrolling entities notice a controlled entity within this distance.
    pub detect_radius: f32,
    /// Chasing entities lose their target beyond this distance.
    pub lose_radius: f32,
    /// How long a lost target is still pursued.
    pub chase_memory: f32,
    /// Minimum time spent chasing before giving up.
    pub min_chase_time: f32,
    /// Length of the pause between two strategies.
    pub transition_duration: f32,
    /// Flying speed in pixels per second, before agility scaling.
    pub flying_speed: f32,
    /// Bounds of the random interval between flying direction changes.
    pub flight_interval: (f32, f32),
    /// Invincibility window after the player takes damage.
    pub invincibility_duration: f32,
    /// Collision resolver tuning.
    pub resolver: ResolverConfig,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            dt: FIXED_DT,
            gravity: 0.5,
            move_speed: 4.0,
            sprint_multiplier: 1.5,
            jump_speed: 11.0,
            stomp_bounce: 6.0,
            walk_speed: 1.5,
            chase_speed: 2.5,
            patrol_band: (100.0, 700.0),
            patrol_reverse_interval: 3.0,
            detect_radius: 100.0,
            lose_radius: 200.0,
            chase_memory: 3.0,
            min_chase_time: 3.0,
            transition_duration: 1.0,
            flying_speed: 90.0,
            flight_interval: (1.0, 4.0),
            invincibility_duration: 1.5,
            resolver: ResolverConfig::default(),
        }
    }
}

impl TuningConfig {
    /// Parses a tuning file; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] if the document is not valid JSON for this shape.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(CoreError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = TuningConfig::default();
        assert_eq!(config.patrol_band, (100.0, 700.0));
        assert!((config.detect_radius - 100.0).abs() < f32::EPSILON);
        assert!((config.lose_radius - 200.0).abs() < f32::EPSILON);
        assert!((config.resolver.tile_margin - 5.0).abs() < f32::EPSILON);
        assert!((config.resolver.seam_threshold - 64.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            TuningConfig::from_json(r#"{ "gravity": 0.8, "resolver": { "tile_margin": 3.0 } }"#)
                .unwrap();
        assert!((config.gravity - 0.8).abs() < f32::EPSILON);
        assert!((config.resolver.tile_margin - 3.0).abs() < f32::EPSILON);
        assert!((config.resolver.seam_threshold - 64.0).abs() < f32::EPSILON);
        assert!((config.move_speed - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            TuningConfig::from_json("{ \"gravity\": \"heavy\" }"),
            Err(CoreError::Config(_))
        ));
    }
}
