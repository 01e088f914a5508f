use super::constants::{SPAWN_DIRECTION, START_PLAYER_MASS};
use super::error::UnitError;
use super::rules::mass_to_radius;
use super::spawner::random_position;
use super::store::Tables;
use super::types::{AccountState, Circle, Entity, Identity, Player, PlayerId, Vector2};
use rand::Rng;

/// Restores a logged-out account or opens a fresh one. No circle is spawned.
pub fn connect(tables: &mut Tables, identity: Identity) -> Result<Player, UnitError> {
  if tables.player(identity).is_some() {
    return Err(UnitError::AlreadyConnected(identity));
  }
  if let Some(player) = tables.delete_logged_out_player(identity) {
    tables.insert_player(player.clone());
    tracing::debug!(%identity, player_id = player.player_id, "player reconnected");
    return Ok(player);
  }
  let player = tables.insert_new_player(identity, String::new());
  tracing::debug!(%identity, player_id = player.player_id, "player created");
  Ok(player)
}

/// Names the player and drops a fresh circle into the arena.
///
/// There is no guard against re-entry: each call spawns another circle.
pub fn enter_game<R: Rng + ?Sized>(
  tables: &mut Tables,
  rng: &mut R,
  identity: Identity,
  name: String,
  now: i64,
) -> Result<Entity, UnitError> {
  tracing::info!(%identity, name = %name, "creating player");
  let mut player = tables
    .player(identity)
    .cloned()
    .ok_or(UnitError::PlayerNotFound(identity))?;
  player.name = name;
  let player_id = player.player_id;
  tables.update_player(player);
  spawn_player_initial_circle(tables, rng, player_id, now)
}

/// Removes every circle the player owns, then parks the account.
pub fn disconnect(tables: &mut Tables, identity: Identity) -> Result<Player, UnitError> {
  let player = tables
    .player(identity)
    .cloned()
    .ok_or(UnitError::PlayerNotFound(identity))?;
  for circle_id in tables.circles_of(player.player_id) {
    tables
      .delete_entity(circle_id)
      .ok_or(UnitError::CircleEntityMissing(circle_id))?;
    tables.delete_circle(circle_id);
  }
  tables.delete_player(identity);
  tables.insert_logged_out_player(player.clone());
  tracing::debug!(%identity, player_id = player.player_id, "player logged out");
  Ok(player)
}

/// Logs the player out even when a circle row has lost its entity.
///
/// Recovery path for a session whose `disconnect` hit an invariant violation,
/// so the identity is not left stuck as connected.
pub fn evict(tables: &mut Tables, identity: Identity) -> Result<Player, UnitError> {
  let player = tables
    .player(identity)
    .cloned()
    .ok_or(UnitError::PlayerNotFound(identity))?;
  for circle_id in tables.circles_of(player.player_id) {
    if tables.delete_entity(circle_id).is_none() {
      tracing::warn!(%identity, circle_id, "dropping circle without entity");
    }
    tables.delete_circle(circle_id);
  }
  tables.delete_player(identity);
  tables.insert_logged_out_player(player.clone());
  tracing::debug!(%identity, player_id = player.player_id, "player evicted");
  Ok(player)
}

pub fn spawn_player_initial_circle<R: Rng + ?Sized>(
  tables: &mut Tables,
  rng: &mut R,
  player_id: PlayerId,
  now: i64,
) -> Result<Entity, UnitError> {
  let world_size = tables.config()?.world_size as f64;
  let position = random_position(rng, mass_to_radius(START_PLAYER_MASS), world_size);
  Ok(spawn_circle_at(tables, player_id, START_PLAYER_MASS, position, now))
}

pub fn spawn_circle_at(
  tables: &mut Tables,
  player_id: PlayerId,
  mass: u32,
  position: Vector2,
  now: i64,
) -> Entity {
  let entity = tables.insert_entity(position, mass);
  tables.insert_circle(Circle {
    entity_id: entity.entity_id,
    player_id,
    direction: Vector2::new(SPAWN_DIRECTION.0, SPAWN_DIRECTION.1),
    speed: 0.0,
    last_split_time: now,
  });
  entity
}

pub fn account_state(tables: &Tables, identity: Identity) -> AccountState {
  match tables.player(identity) {
    None => AccountState::Disconnected,
    Some(player) if tables.circles_of(player.player_id).is_empty() => AccountState::ConnectedNoName,
    Some(_) => AccountState::InGame,
  }
}
