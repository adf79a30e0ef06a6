//! Per-tile metadata and its parsed classification.
//!
//! Authored maps attach free-form string properties to tile ids. The keys the
//! simulation understands are:
//!
//! - `isCollidable`: `"true"`/`"false"`, defaults to collidable for nonzero ids
//! - `isDiagonal`: `"true"`/`"false"`, marks a sloped ramp tile
//! - `SlopeLeft` / `SlopeRight`: integer pixel heights of the ramp surface
//!   above the tile bottom at the tile's left and right edges
//!
//! Parsing happens once, at grid construction, into a [`TileClass`]. Malformed
//! values never fail: they degrade to the nearest safe default and are logged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw string properties attached to a tile id.
pub type TileProperties = HashMap<String, String>;

/// Property key for collidability.
pub const KEY_COLLIDABLE: &str = "isCollidable";
/// Property key for the diagonal flag.
pub const KEY_DIAGONAL: &str = "isDiagonal";
/// Property key for the surface height at the left edge.
pub const KEY_SLOPE_LEFT: &str = "SlopeLeft";
/// Property key for the surface height at the right edge.
pub const KEY_SLOPE_RIGHT: &str = "SlopeRight";

/// Linear ramp surface across one tile.
///
/// `left` and `right` are pixel heights measured upward from the tile bottom.
/// A tile with `left = 0, right = 64` on a 64 px grid is a full-height ramp
/// rising to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slope {
    /// Surface height above the tile bottom at the left edge.
    pub left: i32,
    /// Surface height above the tile bottom at the right edge.
    pub right: i32,
}

impl Slope {
    /// Creates a slope from its edge heights.
    #[must_use]
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Vertical change per horizontal pixel (positive rises to the right).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gradient(&self, tile_size: u32) -> f32 {
        (self.right - self.left) as f32 / tile_size as f32
    }

    /// World Y of the surface at `world_x`.
    ///
    /// `world_x` is clamped into `[tile_left, tile_left + tile_size]` so callers
    /// sampling at an entity center just outside the tile get the edge height.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn surface_y(&self, tile_left: f32, tile_bottom: f32, world_x: f32, tile_size: u32) -> f32 {
        let x = world_x.clamp(tile_left, tile_left + tile_size as f32);
        tile_bottom - self.left as f32 - self.gradient(tile_size) * (x - tile_left)
    }
}

/// Parsed collision classification of a tile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileClass {
    /// Whether the tile takes part in collision at all.
    pub collidable: bool,
    /// Ramp surface, present only for well-formed diagonal tiles.
    pub slope: Option<Slope>,
}

impl TileClass {
    /// Classification of the empty tile (id 0).
    pub const EMPTY: Self = Self {
        collidable: false,
        slope: None,
    };

    /// Classification of a plain solid tile.
    pub const SOLID: Self = Self {
        collidable: true,
        slope: None,
    };

    /// Returns `true` if this tile is a collidable ramp.
    #[must_use]
    pub const fn is_diagonal(&self) -> bool {
        self.collidable && self.slope.is_some()
    }

    /// Parses the properties of a nonzero tile id.
    ///
    /// Never fails. Unparseable values fall back to a collidable flat tile and
    /// emit a `tracing` warning naming the tile id.
    #[must_use]
    pub fn parse(id: u32, props: &TileProperties) -> Self {
        let collidable = match props.get(KEY_COLLIDABLE).map(String::as_str) {
            None => true,
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                tracing::warn!(tile = id, value, "unrecognised isCollidable, treating as collidable");
                true
            }),
        };

        let diagonal = match props.get(KEY_DIAGONAL).map(String::as_str) {
            None => false,
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                tracing::warn!(tile = id, value, "unrecognised isDiagonal, treating as flat");
                false
            }),
        };

        let slope = if diagonal && collidable {
            parse_slope(id, props)
        } else {
            None
        };

        Self { collidable, slope }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_slope(id: u32, props: &TileProperties) -> Option<Slope> {
    let left = props.get(KEY_SLOPE_LEFT);
    let right = props.get(KEY_SLOPE_RIGHT);
    let (Some(left), Some(right)) = (left, right) else {
        tracing::warn!(tile = id, "diagonal tile without SlopeLeft/SlopeRight, treating as flat");
        return None;
    };
    match (left.trim().parse::<i32>(), right.trim().parse::<i32>()) {
        (Ok(left), Ok(right)) => Some(Slope::new(left, right)),
        _ => {
            tracing::warn!(
                tile = id,
                slope_left = %left,
                slope_right = %right,
                "malformed slope offsets, treating as flat"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> TileProperties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn missing_properties_mean_solid() {
        assert_eq!(TileClass::parse(3, &TileProperties::new()), TileClass::SOLID);
    }

    #[test]
    fn non_collidable_tile() {
        let class = TileClass::parse(3, &props(&[(KEY_COLLIDABLE, "false")]));
        assert!(!class.collidable);
        assert!(!class.is_diagonal());
    }

    #[test]
    fn diagonal_tile_with_offsets() {
        let class = TileClass::parse(
            7,
            &props(&[(KEY_DIAGONAL, "true"), (KEY_SLOPE_LEFT, "0"), (KEY_SLOPE_RIGHT, "64")]),
        );
        assert_eq!(class.slope, Some(Slope::new(0, 64)));
        assert!(class.is_diagonal());
    }

    #[test]
    fn malformed_offsets_fall_back_to_flat() {
        let class = TileClass::parse(
            7,
            &props(&[(KEY_DIAGONAL, "true"), (KEY_SLOPE_LEFT, "zero"), (KEY_SLOPE_RIGHT, "64")]),
        );
        assert_eq!(class, TileClass::SOLID);
    }

    #[test]
    fn diagonal_without_offsets_is_flat() {
        let class = TileClass::parse(7, &props(&[(KEY_DIAGONAL, "true")]));
        assert_eq!(class, TileClass::SOLID);
    }

    #[test]
    fn garbage_collidable_value_stays_collidable() {
        let class = TileClass::parse(2, &props(&[(KEY_COLLIDABLE, "maybe")]));
        assert!(class.collidable);
    }

    #[test]
    fn surface_follows_linear_ramp() {
        let slope = Slope::new(0, 64);
        // Tile spans x 64..128, bottom at y 128
        assert!((slope.surface_y(64.0, 128.0, 64.0, 64) - 128.0).abs() < 1e-4);
        assert!((slope.surface_y(64.0, 128.0, 96.0, 64) - 96.0).abs() < 1e-4);
        assert!((slope.surface_y(64.0, 128.0, 128.0, 64) - 64.0).abs() < 1e-4);
    }

    #[test]
    fn surface_clamps_outside_tile_span() {
        let slope = Slope::new(16, 48);
        assert!((slope.surface_y(0.0, 64.0, -20.0, 64) - 48.0).abs() < 1e-4);
        assert!((slope.surface_y(0.0, 64.0, 200.0, 64) - 16.0).abs() < 1e-4);
    }
}
