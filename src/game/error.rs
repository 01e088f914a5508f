use super::types::{EntityId, Identity};
use thiserror::Error;

/// Reasons a unit of work aborts without committing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
  #[error("config singleton not found")]
  ConfigMissing,
  #[error("world is already initialized")]
  AlreadyInitialized,
  #[error("identity {0} is already connected")]
  AlreadyConnected(Identity),
  #[error("player not found for identity {0}")]
  PlayerNotFound(Identity),
  #[error("circle {0} has no entity")]
  CircleEntityMissing(EntityId),
}

impl UnitError {
  /// Invariant violations should never happen after a successful init.
  pub fn is_invariant_violation(&self) -> bool {
    matches!(self, Self::ConfigMissing | Self::CircleEntityMissing(_))
  }
}
