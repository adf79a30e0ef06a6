//! Plain-data save state.
//!
//! A save holds what cannot be rebuilt from the level itself: where every
//! entity is, how hurt the player is, what each AI is doing, which crops are
//! gone, plus the level clock. Restoring expects the same level to have been
//! spawned, so entity ids line up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::CoreError;
use crate::strategy::Strategy;

/// Saved fields of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntity {
    /// Roster id.
    pub id: EntityId,
    /// Kind, checked on restore.
    pub kind: EntityKind,
    /// Top-left corner of the bounding box.
    pub position: Vec2,
    /// Remaining hit points, for entities with health.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    /// Strategy code, for AI entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<u8>,
    /// Crop already harvested.
    #[serde(default)]
    pub collected: bool,
}

impl SavedEntity {
    /// Captures `entity`.
    ///
    /// An entity paused in a transition is saved with the strategy it was
    /// about to enter.
    #[must_use]
    pub fn capture(entity: &Entity) -> Self {
        let strategy = entity.ai.as_ref().map(|ai| match ai.strategy {
            Strategy::Transition => ai.pending.unwrap_or(Strategy::Idle),
            other => other,
        });
        Self {
            id: entity.id(),
            kind: entity.kind(),
            position: entity.position(),
            health: entity.health.map(|h| h.current),
            strategy: strategy.map(Strategy::code),
            collected: entity.collectible.is_some_and(|c| c.collected),
        }
    }

    /// Decodes the saved strategy code.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidStrategy`] for unknown codes and for `Transition`,
    /// which is never saved.
    pub fn decoded_strategy(&self) -> Result<Option<Strategy>, CoreError> {
        match self.strategy.map(Strategy::try_from).transpose()? {
            Some(Strategy::Transition) => Err(CoreError::InvalidStrategy(format!(
                "entity {} saved mid-transition",
                self.id
            ))),
            other => Ok(other),
        }
    }
}

/// Serializable snapshot of a running level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveState {
    /// Level clock in seconds.
    pub elapsed: f32,
    /// Crops still to collect.
    pub crops_remaining: u32,
    /// Live entities in id order.
    pub entities: Vec<SavedEntity>,
}

impl SaveState {
    /// Encodes the save as JSON.
    ///
    /// # Errors
    ///
    /// [`CoreError::Save`] if encoding fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a save from JSON.
    ///
    /// # Errors
    ///
    /// [`CoreError::Save`] for malformed documents.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
