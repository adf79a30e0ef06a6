//! Layered tile grid.
//!
//! The [`TileGrid`] owns the static map: dimensions, tile size, an ordered list
//! of dense row-major [`Layer`]s and the per-tile-id property table. It is built
//! once when a level loads and only changes through [`TileGrid::modify_tile`].
//!
//! # Coordinates
//!
//! Tile coordinates are `(column, row)` with the origin at the top-left of the
//! map; world coordinates are pixels with Y growing downward. Lookups outside
//! the grid fail with [`GridError::OutOfRange`]; collision code clamps first
//! with [`TileGrid::clamp_coords`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use tilegrid::{Layer, TileGrid};
//!
//! let mut tiles = vec![0; 4 * 3];
//! tiles[4 * 2..].fill(1); // bottom row solid
//! let grid = TileGrid::new(4, 3, 64, vec![Layer::new("ground", tiles)], HashMap::new()).unwrap();
//!
//! assert_eq!(grid.tile(0, 1, 2).unwrap(), 1);
//! assert_eq!(grid.world_to_tile(glam::Vec2::new(130.0, 70.0)), (2, 1));
//! assert!(grid.tile(0, 4, 0).is_err());
//! ```

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, LoadError};
use crate::properties::{TileClass, TileProperties};

/// One grid's worth of tile ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    name: String,
    /// Row-major tile ids, 0 = empty.
    tiles: Vec<u32>,
    /// Draw opacity; not used by collision.
    opacity: f32,
}

impl Layer {
    /// Creates a fully opaque layer.
    #[must_use]
    pub fn new(name: impl Into<String>, tiles: Vec<u32>) -> Self {
        Self::with_opacity(name, tiles, 1.0)
    }

    /// Creates a layer with an explicit draw opacity.
    #[must_use]
    pub fn with_opacity(name: impl Into<String>, tiles: Vec<u32>, opacity: f32) -> Self {
        Self {
            name: name.into(),
            tiles,
            opacity,
        }
    }

    /// Layer name as authored.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Draw opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Row-major tile ids.
    #[must_use]
    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }
}

/// Static map data consulted by collision resolution.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    layers: Vec<Layer>,
    properties: HashMap<u32, TileProperties>,
    /// Parsed classification for every id with declared properties.
    classes: HashMap<u32, TileClass>,
    empty: TileProperties,
}

impl TileGrid {
    /// Builds a grid from decoded layers and the tile property table.
    ///
    /// Tile properties are parsed here, once; malformed entries are logged and
    /// degraded (see [`TileClass::parse`]).
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidDimensions`] for zero dimensions and
    /// [`LoadError::LayerSize`] when a layer does not hold `width * height` ids.
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        layers: Vec<Layer>,
        properties: HashMap<u32, TileProperties>,
    ) -> Result<Self, LoadError> {
        if width == 0 || height == 0 || tile_size == 0 {
            return Err(LoadError::InvalidDimensions {
                width,
                height,
                tile_size,
            });
        }

        let expected = width as usize * height as usize;
        if let Some(layer) = layers.iter().find(|l| l.tiles.len() != expected) {
            return Err(LoadError::LayerSize {
                layer: layer.name.clone(),
                expected,
                actual: layer.tiles.len(),
            });
        }

        let classes = properties
            .iter()
            .filter(|(id, _)| **id != 0)
            .map(|(id, props)| (*id, TileClass::parse(*id, props)))
            .collect();

        tracing::debug!(
            width,
            height,
            tile_size,
            layers = layers.len(),
            described_tiles = properties.len(),
            "tile grid built"
        );

        Ok(Self {
            width,
            height,
            tile_size,
            layers,
            properties,
            classes,
            empty: TileProperties::new(),
        })
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Map width in pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_size) as f32
    }

    /// Map height in pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_size) as f32
    }

    /// Layers in declaration order (groups already flattened).
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns the tile id at `(x, y)` in `layer`.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownLayer`] for a bad layer index and
    /// [`GridError::OutOfRange`] for coordinates outside the grid.
    pub fn tile(&self, layer: usize, x: i32, y: i32) -> Result<u32, GridError> {
        let layer_ref = self.layers.get(layer).ok_or(GridError::UnknownLayer {
            index: layer,
            count: self.layers.len(),
        })?;
        let index = self.index_of(x, y)?;
        Ok(layer_ref.tiles[index])
    }

    /// Raw properties for a tile id; empty for id 0 and undeclared ids.
    #[must_use]
    pub fn tile_properties(&self, id: u32) -> &TileProperties {
        if id == 0 {
            return &self.empty;
        }
        self.properties.get(&id).unwrap_or(&self.empty)
    }

    /// Parsed collision classification for a tile id.
    #[must_use]
    pub fn tile_class(&self, id: u32) -> TileClass {
        if id == 0 {
            return TileClass::EMPTY;
        }
        self.classes.get(&id).copied().unwrap_or(TileClass::SOLID)
    }

    /// World position of a tile's top-left corner.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_to_world(&self, tile_x: i32, tile_y: i32) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2::new(tile_x as f32 * size, tile_y as f32 * size)
    }

    /// Tile coordinate containing a world position (floor division).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn world_to_tile(&self, position: Vec2) -> (i32, i32) {
        let size = self.tile_size as f32;
        (
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }

    /// Clamps a tile coordinate into the grid.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn clamp_coords(&self, x: i32, y: i32) -> (u32, u32) {
        (
            x.clamp(0, self.width as i32 - 1) as u32,
            y.clamp(0, self.height as i32 - 1) as u32,
        )
    }

    /// Non-empty tile ids stacked at `(x, y)`, in layer order.
    ///
    /// Yields nothing for coordinates outside the grid.
    pub fn stack_at(&self, x: u32, y: u32) -> impl Iterator<Item = (usize, u32)> + '_ {
        let index = (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize);
        self.layers
            .iter()
            .enumerate()
            .filter_map(move |(layer, l)| index.map(|i| (layer, l.tiles[i])))
            .filter(|(_, id)| *id != 0)
    }

    /// Replaces the tile at `(x, y)` in `layer`, returning the previous id.
    ///
    /// Out-of-range coordinates or layers are a no-op and return `None`.
    pub fn modify_tile(&mut self, layer: usize, x: i32, y: i32, new_id: u32) -> Option<u32> {
        let index = self.index_of(x, y).ok()?;
        let slot = self.layers.get_mut(layer)?.tiles.get_mut(index)?;
        let previous = std::mem::replace(slot, new_id);
        tracing::debug!(layer, x, y, previous, new_id, "tile modified");
        Some(previous)
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn index_of(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return Err(GridError::OutOfRange {
                x: i64::from(x),
                y: i64::from(y),
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{KEY_COLLIDABLE, KEY_DIAGONAL, KEY_SLOPE_LEFT, KEY_SLOPE_RIGHT};

    fn grid_with(tiles: Vec<u32>, props: HashMap<u32, TileProperties>) -> TileGrid {
        TileGrid::new(3, 2, 64, vec![Layer::new("main", tiles)], props).unwrap()
    }

    fn props(pairs: &[(&str, &str)]) -> TileProperties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_zero_dimensions() {
            let err = TileGrid::new(0, 2, 64, vec![], HashMap::new()).unwrap_err();
            assert!(matches!(err, LoadError::InvalidDimensions { .. }));
        }

        #[test]
        fn rejects_short_layer() {
            let err = TileGrid::new(3, 2, 64, vec![Layer::new("bad", vec![0; 5])], HashMap::new())
                .unwrap_err();
            assert!(matches!(
                err,
                LoadError::LayerSize {
                    expected: 6,
                    actual: 5,
                    ..
                }
            ));
        }

        #[test]
        fn pixel_extents() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert!((grid.pixel_width() - 192.0).abs() < f32::EPSILON);
            assert!((grid.pixel_height() - 128.0).abs() < f32::EPSILON);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn tile_reads_row_major() {
            let grid = grid_with(vec![1, 2, 3, 4, 5, 6], HashMap::new());
            assert_eq!(grid.tile(0, 0, 0).unwrap(), 1);
            assert_eq!(grid.tile(0, 2, 0).unwrap(), 3);
            assert_eq!(grid.tile(0, 1, 1).unwrap(), 5);
        }

        #[test]
        fn tile_out_of_range() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert!(matches!(grid.tile(0, -1, 0), Err(GridError::OutOfRange { .. })));
            assert!(matches!(grid.tile(0, 3, 0), Err(GridError::OutOfRange { .. })));
            assert!(matches!(grid.tile(0, 0, 2), Err(GridError::OutOfRange { .. })));
        }

        #[test]
        fn tile_unknown_layer() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert_eq!(
                grid.tile(1, 0, 0),
                Err(GridError::UnknownLayer { index: 1, count: 1 })
            );
        }

        #[test]
        fn properties_empty_for_zero_and_undeclared() {
            let mut table = HashMap::new();
            table.insert(0, props(&[(KEY_COLLIDABLE, "false")]));
            table.insert(2, props(&[(KEY_COLLIDABLE, "false")]));
            let grid = grid_with(vec![0; 6], table);

            assert!(grid.tile_properties(0).is_empty());
            assert!(grid.tile_properties(9).is_empty());
            assert_eq!(grid.tile_properties(2).get(KEY_COLLIDABLE).unwrap(), "false");
        }

        #[test]
        fn classes_are_parsed_once() {
            let mut table = HashMap::new();
            table.insert(2, props(&[(KEY_COLLIDABLE, "false")]));
            table.insert(
                3,
                props(&[(KEY_DIAGONAL, "true"), (KEY_SLOPE_LEFT, "0"), (KEY_SLOPE_RIGHT, "64")]),
            );
            let grid = grid_with(vec![0; 6], table);

            assert_eq!(grid.tile_class(0), TileClass::EMPTY);
            assert_eq!(grid.tile_class(1), TileClass::SOLID);
            assert!(!grid.tile_class(2).collidable);
            assert!(grid.tile_class(3).is_diagonal());
        }

        #[test]
        fn stack_at_skips_empty_and_out_of_range() {
            let grid = TileGrid::new(
                2,
                1,
                32,
                vec![Layer::new("a", vec![0, 4]), Layer::new("b", vec![7, 5])],
                HashMap::new(),
            )
            .unwrap();

            assert_eq!(grid.stack_at(0, 0).collect::<Vec<_>>(), vec![(1, 7)]);
            assert_eq!(grid.stack_at(1, 0).collect::<Vec<_>>(), vec![(0, 4), (1, 5)]);
            assert_eq!(grid.stack_at(2, 0).count(), 0);
        }
    }

    mod coordinates {
        use super::*;

        #[test]
        fn tile_to_world_scales() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert_eq!(grid.tile_to_world(2, 1), Vec2::new(128.0, 64.0));
        }

        #[test]
        fn world_to_tile_floors_negative() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert_eq!(grid.world_to_tile(Vec2::new(-1.0, 63.9)), (-1, 0));
            assert_eq!(grid.world_to_tile(Vec2::new(64.0, 64.0)), (1, 1));
        }

        #[test]
        fn clamp_coords_pins_to_edges() {
            let grid = grid_with(vec![0; 6], HashMap::new());
            assert_eq!(grid.clamp_coords(-5, 10), (0, 1));
            assert_eq!(grid.clamp_coords(1, 1), (1, 1));
        }
    }

    mod modification {
        use super::*;

        #[test]
        fn modify_tile_replaces_in_place() {
            let mut grid = grid_with(vec![1; 6], HashMap::new());
            assert_eq!(grid.modify_tile(0, 1, 1, 0), Some(1));
            assert_eq!(grid.tile(0, 1, 1).unwrap(), 0);
        }

        #[test]
        fn modify_tile_out_of_range_is_noop() {
            let mut grid = grid_with(vec![1; 6], HashMap::new());
            assert_eq!(grid.modify_tile(0, 5, 0, 0), None);
            assert_eq!(grid.modify_tile(3, 0, 0, 0), None);
            assert!(grid.layers()[0].tiles().iter().all(|id| *id == 1));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn world_to_tile_inverts_tile_to_world(x in 0i32..3, y in 0i32..2, dx in 0.0f32..63.9, dy in 0.0f32..63.9) {
                let grid = grid_with(vec![0; 6], HashMap::new());
                let origin = grid.tile_to_world(x, y);
                prop_assert_eq!(grid.world_to_tile(origin + Vec2::new(dx, dy)), (x, y));
            }

            #[test]
            fn clamped_coords_are_always_in_range(x in -1000i32..1000, y in -1000i32..1000) {
                let grid = grid_with(vec![0; 6], HashMap::new());
                let (cx, cy) = grid.clamp_coords(x, y);
                #[allow(clippy::cast_possible_wrap)]
                let lookup = grid.tile(0, cx as i32, cy as i32);
                prop_assert!(lookup.is_ok());
            }
        }
    }
}
