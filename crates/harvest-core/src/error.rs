//! Error type for the simulation core.

use thiserror::Error;

use crate::entity::EntityId;

/// Errors surfaced by the simulation core.
///
/// Authored-map problems never show up here: malformed tile metadata degrades
/// to safe defaults inside the tile grid. What remains are programmer errors
/// and corrupt state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A strategy code or state that the engine cannot act on.
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),
    /// A tile lookup that escaped clamping.
    #[error(transparent)]
    Grid(#[from] tilegrid::GridError),
    /// An entity id that is not in the roster.
    #[error("entity {0} is not in the roster")]
    UnknownEntity(EntityId),
    /// Save data could not be encoded or decoded.
    #[error("save data: {0}")]
    Save(#[from] serde_json::Error),
    /// Tuning configuration could not be parsed.
    #[error("tuning config: {0}")]
    Config(serde_json::Error),
}
