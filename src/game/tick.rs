use super::constants::MINIMUM_SAFE_MASS_RATIO;
use super::error::UnitError;
use super::math::{add, clamp, scale};
use super::rules::{is_overlapping, mass_to_max_move_speed, mass_to_radius};
use super::store::Tables;
use super::types::{Entity, Vector2};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
  pub circles_moved: usize,
  pub food_eaten: usize,
  pub circles_eaten: usize,
}

fn clamp_to_world(position: Vector2, mass: u32, world_size: f64) -> Vector2 {
  let radius = mass_to_radius(mass);
  Vector2 {
    x: clamp(position.x, radius, world_size - radius),
    y: clamp(position.y, radius, world_size - radius),
  }
}

/// Advances every circle one step and resolves everything it now overlaps.
///
/// Circles are processed in ascending entity id. Consumed rows are deleted as
/// soon as they are found, so circles later in the order never see them and
/// a circle eaten earlier in the tick is skipped.
pub fn move_all_players(tables: &mut Tables) -> Result<TickReport, UnitError> {
  let world_size = tables.config()?.world_size as f64;
  let mut report = TickReport::default();

  for circle_id in tables.circle_ids() {
    let Some(circle) = tables.circle(circle_id) else { continue };
    let Some(mut circle_entity) = tables.entity(circle_id) else { continue };

    let step = scale(
      circle.direction,
      circle.speed * mass_to_max_move_speed(circle_entity.mass),
    );
    circle_entity.position = clamp_to_world(
      add(circle_entity.position, step),
      circle_entity.mass,
      world_size,
    );
    report.circles_moved += 1;

    for other_id in tables.entity_ids() {
      if other_id == circle_id {
        continue;
      }
      let Some(other) = tables.entity(other_id) else { continue };
      if !is_overlapping(&circle_entity, &other) {
        continue;
      }

      if tables.is_food(other_id) {
        consume(tables, &mut circle_entity, &other);
        tables.delete_food(other_id);
        report.food_eaten += 1;
      } else if let Some(other_circle) = tables.circle(other_id) {
        if other_circle.player_id == circle.player_id {
          continue;
        }
        let mass_ratio = other.mass as f64 / circle_entity.mass as f64;
        if mass_ratio < MINIMUM_SAFE_MASS_RATIO {
          consume(tables, &mut circle_entity, &other);
          tables.delete_circle(other_id);
          report.circles_eaten += 1;
        }
      }
    }

    // Growth can push the rim past the wall; keep the bounds invariant.
    circle_entity.position = clamp_to_world(circle_entity.position, circle_entity.mass, world_size);
    tables.update_entity(circle_entity);
  }

  Ok(report)
}

fn consume(tables: &mut Tables, eater: &mut Entity, eaten: &Entity) {
  tables.delete_entity(eaten.entity_id);
  eater.mass += eaten.mass;
}
