use super::constants::{FOOD_MASS_MAX, FOOD_MASS_MIN, TARGET_FOOD_COUNT};
use super::error::UnitError;
use super::rules::mass_to_radius;
use super::store::Tables;
use super::types::{Food, Vector2};
use rand::Rng;

/// Uniform position keeping a circle of `radius` fully inside the arena.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, radius: f64, world_size: f64) -> Vector2 {
  let max = world_size - radius;
  if max < radius {
    return Vector2::new(world_size / 2.0, world_size / 2.0);
  }
  Vector2::new(rng.gen_range(radius..=max), rng.gen_range(radius..=max))
}

/// Tops food up to the target count. Returns how many were spawned.
pub fn spawn_food<R: Rng + ?Sized>(tables: &mut Tables, rng: &mut R) -> Result<usize, UnitError> {
  if tables.player_count() == 0 {
    return Ok(0);
  }

  let world_size = tables.config()?.world_size as f64;
  let mut food_count = tables.food_count();
  let mut spawned = 0;
  while food_count < TARGET_FOOD_COUNT {
    let food_mass = rng.gen_range(FOOD_MASS_MIN..=FOOD_MASS_MAX);
    let position = random_position(rng, mass_to_radius(food_mass), world_size);
    let entity = tables.insert_entity(position, food_mass);
    tables.insert_food(Food {
      entity_id: entity.entity_id,
    });
    food_count += 1;
    spawned += 1;
    tracing::info!(entity_id = entity.entity_id, mass = food_mass, "spawned food");
  }
  Ok(spawned)
}
