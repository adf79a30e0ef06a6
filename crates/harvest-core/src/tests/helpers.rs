//! Grid builders for tests.
//!
//! Maps are drawn as rows of characters on a 64 px grid:
//!
//! | char | tile                                      |
//! |------|-------------------------------------------|
//! | `.`  | empty                                     |
//! | `#`  | solid (id 1)                              |
//! | `/`  | ramp rising to the right, 0 to 64 (id 2)  |
//! | `\`  | ramp falling to the right, 64 to 0 (id 3) |
//! | `o`  | non-collidable decoration (id 4)          |

use std::collections::HashMap;

use tilegrid::properties::{KEY_COLLIDABLE, KEY_DIAGONAL, KEY_SLOPE_LEFT, KEY_SLOPE_RIGHT};
use tilegrid::{Layer, TileGrid, TileProperties};

/// Tile size of every test grid.
pub const TILE: u32 = 64;

/// Solid tile id.
pub const SOLID: u32 = 1;
/// Rising ramp tile id.
pub const RAMP_UP: u32 = 2;
/// Falling ramp tile id.
pub const RAMP_DOWN: u32 = 3;
/// Decoration tile id.
pub const DECOR: u32 = 4;

fn props(pairs: &[(&str, &str)]) -> TileProperties {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Property table understood by [`grid_from_rows`].
pub fn test_properties() -> HashMap<u32, TileProperties> {
    HashMap::from([
        (SOLID, props(&[(KEY_COLLIDABLE, "true")])),
        (
            RAMP_UP,
            props(&[(KEY_DIAGONAL, "true"), (KEY_SLOPE_LEFT, "0"), (KEY_SLOPE_RIGHT, "64")]),
        ),
        (
            RAMP_DOWN,
            props(&[(KEY_DIAGONAL, "true"), (KEY_SLOPE_LEFT, "64"), (KEY_SLOPE_RIGHT, "0")]),
        ),
        (DECOR, props(&[(KEY_COLLIDABLE, "false")])),
    ])
}

/// Builds a single-layer grid from character rows.
///
/// # Panics
///
/// On unknown characters or rows of unequal length.
pub fn grid_from_rows(rows: &[&str]) -> TileGrid {
    let width = rows[0].len();
    let tiles: Vec<u32> = rows
        .iter()
        .flat_map(|row| {
            assert_eq!(row.len(), width, "ragged row {row:?}");
            row.chars().map(|c| match c {
                '.' => 0,
                '#' => SOLID,
                '/' => RAMP_UP,
                '\\' => RAMP_DOWN,
                'o' => DECOR,
                other => panic!("unknown tile char {other:?}"),
            })
        })
        .collect();

    TileGrid::new(
        u32::try_from(width).unwrap(),
        u32::try_from(rows.len()).unwrap(),
        TILE,
        vec![Layer::new("ground", tiles)],
        test_properties(),
    )
    .unwrap()
}

/// Open level `width` tiles wide and `height` tall with a solid bottom row.
pub fn wide_floor(width: u32, height: u32) -> TileGrid {
    let mut tiles = vec![0; (width * height) as usize];
    let floor = ((height - 1) * width) as usize;
    tiles[floor..].fill(SOLID);
    TileGrid::new(
        width,
        height,
        TILE,
        vec![Layer::new("ground", tiles)],
        test_properties(),
    )
    .unwrap()
}

/// Routes `tracing` output to the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
