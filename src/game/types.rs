use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type EntityId = u32;
pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
  pub x: f64,
  pub y: f64,
}

impl Vector2 {
  pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Opaque connection principal supplied by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
  pub fn new_random() -> Self {
    Self(Uuid::new_v4())
  }

  pub fn parse(value: &str) -> Option<Self> {
    Uuid::parse_str(value.trim()).ok().map(Self)
  }
}

impl From<Uuid> for Identity {
  fn from(value: Uuid) -> Self {
    Self(value)
  }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  pub world_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
  pub entity_id: EntityId,
  pub position: Vector2,
  pub mass: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
  pub entity_id: EntityId,
  pub player_id: PlayerId,
  pub direction: Vector2,
  pub speed: f64,
  pub last_split_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
  pub entity_id: EntityId,
}

/// Row shape shared by the `Player` and `LoggedOutPlayer` tables.
///
/// The identity reclaims an account, so it never goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
  #[serde(skip)]
  pub identity: Identity,
  pub player_id: PlayerId,
  pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountState {
  Disconnected,
  ConnectedNoName,
  InGame,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
  pub entities: Vec<Entity>,
  pub circles: Vec<Circle>,
  pub food: Vec<Food>,
  pub players: Vec<Player>,
}
