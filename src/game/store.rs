//! In-process table set backing the arena.
//!
//! Every table is keyed by its primary key in an ordered map so iteration is
//! deterministic. Circles carry a secondary index on `player_id`. Units of
//! work run against a scratch copy of the tables and only replace the live
//! copy when they return `Ok`.

use super::error::UnitError;
use super::types::{
  Circle, Config, Entity, EntityId, Food, Identity, Player, PlayerId, Vector2, WorldSnapshot,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct Tables {
  config: Option<Config>,
  entities: BTreeMap<EntityId, Entity>,
  circles: BTreeMap<EntityId, Circle>,
  circles_by_player: BTreeMap<PlayerId, BTreeSet<EntityId>>,
  food: BTreeMap<EntityId, Food>,
  players: BTreeMap<Identity, Player>,
  logged_out_players: BTreeMap<Identity, Player>,
  next_entity_id: EntityId,
  next_player_id: PlayerId,
}

impl Default for Tables {
  fn default() -> Self {
    Self {
      config: None,
      entities: BTreeMap::new(),
      circles: BTreeMap::new(),
      circles_by_player: BTreeMap::new(),
      food: BTreeMap::new(),
      players: BTreeMap::new(),
      logged_out_players: BTreeMap::new(),
      next_entity_id: 1,
      next_player_id: 1,
    }
  }
}

impl Tables {
  pub fn config(&self) -> Result<Config, UnitError> {
    self.config.ok_or(UnitError::ConfigMissing)
  }

  pub fn has_config(&self) -> bool {
    self.config.is_some()
  }

  pub fn set_config(&mut self, config: Config) {
    self.config = Some(config);
  }

  pub fn insert_entity(&mut self, position: Vector2, mass: u32) -> Entity {
    let entity = Entity {
      entity_id: self.next_entity_id,
      position,
      mass,
    };
    self.next_entity_id += 1;
    self.entities.insert(entity.entity_id, entity);
    entity
  }

  pub fn entity(&self, entity_id: EntityId) -> Option<Entity> {
    self.entities.get(&entity_id).copied()
  }

  /// Writes back an existing row. Rows deleted earlier in the unit stay deleted.
  pub fn update_entity(&mut self, entity: Entity) -> bool {
    match self.entities.get_mut(&entity.entity_id) {
      Some(row) => {
        *row = entity;
        true
      }
      None => false,
    }
  }

  pub fn delete_entity(&mut self, entity_id: EntityId) -> Option<Entity> {
    self.entities.remove(&entity_id)
  }

  pub fn entity_ids(&self) -> Vec<EntityId> {
    self.entities.keys().copied().collect()
  }

  #[cfg(test)]
  pub fn entities(&self) -> impl Iterator<Item = &Entity> {
    self.entities.values()
  }

  pub fn insert_circle(&mut self, circle: Circle) {
    self
      .circles_by_player
      .entry(circle.player_id)
      .or_default()
      .insert(circle.entity_id);
    self.circles.insert(circle.entity_id, circle);
  }

  pub fn circle(&self, entity_id: EntityId) -> Option<Circle> {
    self.circles.get(&entity_id).copied()
  }

  pub fn update_circle(&mut self, circle: Circle) -> bool {
    let Some(row) = self.circles.get_mut(&circle.entity_id) else { return false };
    let previous_owner = row.player_id;
    *row = circle;
    if previous_owner != circle.player_id {
      self.unindex_circle(previous_owner, circle.entity_id);
      self
        .circles_by_player
        .entry(circle.player_id)
        .or_default()
        .insert(circle.entity_id);
    }
    true
  }

  pub fn delete_circle(&mut self, entity_id: EntityId) -> Option<Circle> {
    let circle = self.circles.remove(&entity_id)?;
    self.unindex_circle(circle.player_id, entity_id);
    Some(circle)
  }

  pub fn circle_ids(&self) -> Vec<EntityId> {
    self.circles.keys().copied().collect()
  }

  /// Entity ids of every circle owned by `player_id`, ascending.
  pub fn circles_of(&self, player_id: PlayerId) -> Vec<EntityId> {
    self
      .circles_by_player
      .get(&player_id)
      .map(|ids| ids.iter().copied().collect())
      .unwrap_or_default()
  }

  #[cfg(test)]
  pub fn circles(&self) -> impl Iterator<Item = &Circle> {
    self.circles.values()
  }

  #[cfg(test)]
  pub fn circle_count(&self) -> usize {
    self.circles.len()
  }

  fn unindex_circle(&mut self, player_id: PlayerId, entity_id: EntityId) {
    if let Some(ids) = self.circles_by_player.get_mut(&player_id) {
      ids.remove(&entity_id);
      if ids.is_empty() {
        self.circles_by_player.remove(&player_id);
      }
    }
  }

  pub fn insert_food(&mut self, food: Food) {
    self.food.insert(food.entity_id, food);
  }

  pub fn is_food(&self, entity_id: EntityId) -> bool {
    self.food.contains_key(&entity_id)
  }

  pub fn delete_food(&mut self, entity_id: EntityId) -> Option<Food> {
    self.food.remove(&entity_id)
  }

  pub fn food_count(&self) -> usize {
    self.food.len()
  }

  #[cfg(test)]
  pub fn food(&self) -> impl Iterator<Item = &Food> {
    self.food.values()
  }

  pub fn player(&self, identity: Identity) -> Option<&Player> {
    self.players.get(&identity)
  }

  /// Inserts a brand new account, assigning the next `player_id`.
  pub fn insert_new_player(&mut self, identity: Identity, name: String) -> Player {
    let player = Player {
      identity,
      player_id: self.next_player_id,
      name,
    };
    self.next_player_id += 1;
    self.players.insert(identity, player.clone());
    player
  }

  /// Inserts an existing account row, keeping its `player_id`.
  pub fn insert_player(&mut self, player: Player) {
    self.players.insert(player.identity, player);
  }

  pub fn update_player(&mut self, player: Player) -> bool {
    match self.players.get_mut(&player.identity) {
      Some(row) => {
        *row = player;
        true
      }
      None => false,
    }
  }

  pub fn delete_player(&mut self, identity: Identity) -> Option<Player> {
    self.players.remove(&identity)
  }

  pub fn player_count(&self) -> usize {
    self.players.len()
  }

  #[cfg(test)]
  pub fn logged_out_player(&self, identity: Identity) -> Option<&Player> {
    self.logged_out_players.get(&identity)
  }

  pub fn insert_logged_out_player(&mut self, player: Player) {
    self.logged_out_players.insert(player.identity, player);
  }

  pub fn delete_logged_out_player(&mut self, identity: Identity) -> Option<Player> {
    self.logged_out_players.remove(&identity)
  }

  /// Copy of the publicly visible tables.
  pub fn snapshot(&self) -> WorldSnapshot {
    WorldSnapshot {
      entities: self.entities.values().copied().collect(),
      circles: self.circles.values().copied().collect(),
      food: self.food.values().copied().collect(),
      players: self.players.values().cloned().collect(),
    }
  }
}

#[derive(Debug, Default)]
pub struct WorldStore {
  tables: Tables,
}

impl WorldStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn tables(&self) -> &Tables {
    &self.tables
  }

  /// Runs one all-or-nothing unit of work.
  ///
  /// The unit works on a full copy of the tables, which is cheap at the
  /// target food population. Units that cannot fail go through [`Self::apply`].
  pub fn transact<T, F>(&mut self, unit: F) -> Result<T, UnitError>
  where
    F: FnOnce(&mut Tables) -> Result<T, UnitError>,
  {
    let mut scratch = self.tables.clone();
    let output = unit(&mut scratch)?;
    self.tables = scratch;
    Ok(output)
  }

  /// Runs a unit with no failure path directly against the live tables.
  pub fn apply<T, F>(&mut self, unit: F) -> T
  where
    F: FnOnce(&mut Tables) -> T,
  {
    unit(&mut self.tables)
  }
}
