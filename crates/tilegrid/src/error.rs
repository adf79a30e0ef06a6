//! Error types for grid access and map loading.

use thiserror::Error;

/// Errors raised by direct tile lookups.
///
/// These indicate programmer errors: callers are expected to clamp
/// coordinates with [`TileGrid::clamp_coords`](crate::TileGrid::clamp_coords)
/// before looking tiles up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Tile coordinate outside `[0, width) x [0, height)`.
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfRange {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Grid width in tiles.
        width: u32,
        /// Grid height in tiles.
        height: u32,
    },
    /// Layer index past the end of the layer list.
    #[error("layer {index} does not exist ({count} layers)")]
    UnknownLayer {
        /// Requested layer index.
        index: usize,
        /// Number of layers in the grid.
        count: usize,
    },
}

/// Errors raised while turning a map description into a [`TileGrid`](crate::TileGrid).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is not valid map JSON.
    #[error("invalid map document: {0}")]
    Json(#[from] serde_json::Error),
    /// A base64 layer payload could not be decoded.
    #[error("layer '{layer}' has invalid base64 data: {source}")]
    Base64 {
        /// Layer name.
        layer: String,
        /// Decoder error.
        #[source]
        source: base64::DecodeError,
    },
    /// A compressed layer payload could not be inflated.
    #[error("layer '{layer}' has corrupt {compression} data: {source}")]
    Decompress {
        /// Layer name.
        layer: String,
        /// Declared compression.
        compression: String,
        /// Inflate error.
        #[source]
        source: std::io::Error,
    },
    /// The layer uses a compression scheme the loader does not handle.
    #[error("layer '{layer}' uses unsupported compression '{compression}'")]
    UnsupportedCompression {
        /// Layer name.
        layer: String,
        /// Declared compression.
        compression: String,
    },
    /// The layer declares an encoding other than csv or base64.
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding {
        /// Layer name.
        layer: String,
        /// Declared encoding.
        encoding: String,
    },
    /// Decoded tile count does not match the map dimensions.
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    LayerSize {
        /// Layer name.
        layer: String,
        /// `width * height`.
        expected: usize,
        /// Tiles actually decoded.
        actual: usize,
    },
    /// Zero width, height or tile size.
    #[error("map dimensions must be nonzero (width {width}, height {height}, tile size {tile_size})")]
    InvalidDimensions {
        /// Width in tiles.
        width: u32,
        /// Height in tiles.
        height: u32,
        /// Tile edge in pixels.
        tile_size: u32,
    },
    /// A tile property key is not a tile id.
    #[error("tile property key '{0}' is not a tile id")]
    PropertyKey(String),
}
