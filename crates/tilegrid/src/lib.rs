//! # Tilegrid
//!
//! Static map substrate for the Harvest platformer simulation.
//!
//! A [`TileGrid`] holds an ordered stack of row-major tile layers plus the
//! free-form properties authored per tile id. Properties are parsed once into a
//! [`TileClass`] (collidable flag and optional ramp [`Slope`]) so the collision
//! resolver never touches strings on the hot path.
//!
//! ## Quick Start
//!
//! ```
//! use tilegrid::load_grid;
//!
//! let grid = load_grid(r#"{
//!     "width": 2, "height": 2, "tilewidth": 64,
//!     "layers": [{ "type": "tilelayer", "name": "ground", "data": [0, 0, 1, 3] }],
//!     "tileproperties": {
//!         "3": { "isDiagonal": "true", "SlopeLeft": "0", "SlopeRight": "64" }
//!     }
//! }"#).unwrap();
//!
//! assert!(grid.tile_class(1).collidable);
//! assert!(grid.tile_class(3).is_diagonal());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod grid;
pub mod loader;
pub mod properties;

// Re-exports for convenience
pub use error::{GridError, LoadError};
pub use grid::{Layer, TileGrid};
pub use loader::{load_grid, LayerData, LayerDescription, MapDescription, TileLayerDescription};
pub use properties::{Slope, TileClass, TileProperties};
