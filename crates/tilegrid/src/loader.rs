//! Tile-map description loader.
//!
//! Reads the JSON export of the map editor (the Tiled JSON layout) into a
//! [`TileGrid`]. Only what collision needs is interpreted: dimensions, tile
//! layers (including nested groups, flattened depth-first) and per-tile-id
//! properties. Object layers and image layers are ignored.
//!
//! Layer data may be a plain id array or a base64 string of little-endian
//! `u32` ids, optionally gzip or zlib compressed.

use std::collections::HashMap;
use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::{GzDecoder, ZlibDecoder};
use serde::Deserialize;

use crate::error::LoadError;
use crate::grid::{Layer, TileGrid};
use crate::properties::TileProperties;

/// Flip/rotation flags the editor stores in the top bits of a tile id.
pub const FLIP_FLAGS_MASK: u32 = 0xE000_0000;

/// Top-level map document.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDescription {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile edge in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    /// Tile height in pixels; tiles are square so this must match `tile_width`.
    #[serde(rename = "tileheight", default)]
    pub tile_height: Option<u32>,
    /// Layers in draw order.
    #[serde(default)]
    pub layers: Vec<LayerDescription>,
    /// Properties keyed by tile id (as a string, the way the editor writes it).
    #[serde(rename = "tileproperties", default)]
    pub tile_properties: HashMap<String, TileProperties>,
}

/// A layer entry in the map document.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum LayerDescription {
    /// Grid of tile ids.
    #[serde(rename = "tilelayer")]
    Tiles(TileLayerDescription),
    /// Named group of nested layers.
    #[serde(rename = "group")]
    Group {
        /// Group name.
        #[serde(default)]
        name: String,
        /// Nested layers.
        #[serde(default)]
        layers: Vec<LayerDescription>,
    },
    /// Object, image and any other layer kinds.
    #[serde(other)]
    Other,
}

/// A tile layer entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TileLayerDescription {
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Tile ids, plain or encoded.
    pub data: LayerData,
    /// `"csv"` (default) or `"base64"`.
    #[serde(default)]
    pub encoding: Option<String>,
    /// Compression of base64 payloads, if any.
    #[serde(default)]
    pub compression: Option<String>,
    /// Draw opacity.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

/// Raw layer payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayerData {
    /// Plain array of ids.
    Ids(Vec<u32>),
    /// Encoded string payload.
    Encoded(String),
}

fn default_opacity() -> f32 {
    1.0
}

impl MapDescription {
    /// Parses a map document.
    ///
    /// # Errors
    ///
    /// [`LoadError::Json`] if the document does not match the expected layout.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes layers and properties into a [`TileGrid`].
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] raised by layer decoding or grid validation.
    pub fn into_grid(self) -> Result<TileGrid, LoadError> {
        if let Some(tile_height) = self.tile_height {
            if tile_height != self.tile_width {
                tracing::warn!(
                    tile_width = self.tile_width,
                    tile_height,
                    "non-square tiles, using tile width for both axes"
                );
            }
        }

        let mut layers = Vec::new();
        flatten_layers(self.layers, &mut layers)?;

        let mut properties = HashMap::with_capacity(self.tile_properties.len());
        for (key, props) in self.tile_properties {
            let id = key
                .trim()
                .parse::<u32>()
                .map_err(|_| LoadError::PropertyKey(key.clone()))?;
            properties.insert(id, props);
        }

        TileGrid::new(self.width, self.height, self.tile_width, layers, properties)
    }
}

/// Convenience: parse and decode in one step.
///
/// # Errors
///
/// See [`MapDescription::from_json`] and [`MapDescription::into_grid`].
pub fn load_grid(json: &str) -> Result<TileGrid, LoadError> {
    MapDescription::from_json(json)?.into_grid()
}

fn flatten_layers(descs: Vec<LayerDescription>, out: &mut Vec<Layer>) -> Result<(), LoadError> {
    for desc in descs {
        match desc {
            LayerDescription::Tiles(layer) => out.push(decode_layer(layer)?),
            LayerDescription::Group { name, layers } => {
                tracing::trace!(group = %name, nested = layers.len(), "flattening layer group");
                flatten_layers(layers, out)?;
            }
            LayerDescription::Other => {}
        }
    }
    Ok(())
}

fn decode_layer(desc: TileLayerDescription) -> Result<Layer, LoadError> {
    let TileLayerDescription {
        name,
        data,
        encoding,
        compression,
        opacity,
    } = desc;

    let compression = compression.filter(|c| !c.is_empty());
    let is_base64 = matches!(data, LayerData::Encoded(_)) && encoding.as_deref() == Some("base64");
    if let Some(compression) = compression.as_ref().filter(|_| !is_base64) {
        return Err(LoadError::UnsupportedCompression {
            layer: name,
            compression: compression.clone(),
        });
    }

    let ids = match data {
        LayerData::Ids(ids) => ids,
        LayerData::Encoded(payload) => match encoding.as_deref() {
            Some("base64") => decode_base64(&name, &payload, compression.as_deref())?,
            Some("csv") | None => decode_csv(&name, &payload)?,
            Some(other) => {
                return Err(LoadError::UnsupportedEncoding {
                    layer: name,
                    encoding: other.to_string(),
                })
            }
        },
    };

    let tiles = ids.into_iter().map(|id| id & !FLIP_FLAGS_MASK).collect();
    Ok(Layer::with_opacity(name, tiles, opacity))
}

fn decode_base64(
    layer: &str,
    payload: &str,
    compression: Option<&str>,
) -> Result<Vec<u32>, LoadError> {
    let raw = STANDARD
        .decode(payload.trim())
        .map_err(|source| LoadError::Base64 {
            layer: layer.to_string(),
            source,
        })?;
    let bytes = match compression {
        Some(compression) => inflate(layer, compression, &raw)?,
        None => raw,
    };
    if bytes.len() % 4 != 0 {
        return Err(LoadError::LayerSize {
            layer: layer.to_string(),
            expected: bytes.len().next_multiple_of(4) / 4,
            actual: bytes.len() / 4,
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn inflate(layer: &str, compression: &str, raw: &[u8]) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    let read = match compression {
        "zlib" => ZlibDecoder::new(raw).read_to_end(&mut bytes),
        "gzip" => GzDecoder::new(raw).read_to_end(&mut bytes),
        other => {
            return Err(LoadError::UnsupportedCompression {
                layer: layer.to_string(),
                compression: other.to_string(),
            })
        }
    };
    read.map_err(|source| LoadError::Decompress {
        layer: layer.to_string(),
        compression: compression.to_string(),
        source,
    })?;
    tracing::trace!(layer, compression, bytes = bytes.len(), "inflated layer data");
    Ok(bytes)
}

fn decode_csv(layer: &str, payload: &str) -> Result<Vec<u32>, LoadError> {
    payload
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| LoadError::UnsupportedEncoding {
                layer: layer.to_string(),
                encoding: format!("csv with non-numeric entry '{s}'"),
            })
        })
        .collect()
}
