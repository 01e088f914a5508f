use super::constants::{START_PLAYER_MASS, START_PLAYER_SPEED};
use super::math::distance_sq;
use super::types::Entity;

pub fn mass_to_radius(mass: u32) -> f64 {
  (mass as f64).sqrt()
}

pub fn mass_to_max_move_speed(mass: u32) -> f64 {
  2.0 * START_PLAYER_SPEED / (1.0 + (mass as f64 / START_PLAYER_MASS as f64).sqrt())
}

/// True once the smaller circle's center is inside the larger circle.
pub fn is_overlapping(a: &Entity, b: &Entity) -> bool {
  let max_radius = mass_to_radius(a.mass).max(mass_to_radius(b.mass));
  distance_sq(a.position, b.position) <= max_radius * max_radius
}
