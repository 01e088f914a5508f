use super::math::{clamp, length, normalize};
use super::store::Tables;
use super::types::{Identity, Vector2};

/// Splits a raw stick vector into a unit direction and a speed in `[0, 1]`.
pub fn parse_direction(value: Vector2) -> (Vector2, f64) {
    if !value.x.is_finite() || !value.y.is_finite() {
        return (Vector2::ZERO, 0.0);
    }
    let magnitude = length(value);
    if !magnitude.is_finite() {
        return (Vector2::ZERO, 0.0);
    }
    (normalize(value), clamp(magnitude, 0.0, 1.0))
}

/// Points every circle of the sender's player along `direction`.
///
/// Input from an identity without a player is a late message racing a
/// disconnect and is dropped. Returns how many circles were updated.
pub fn update_player_input(tables: &mut Tables, sender: Identity, direction: Vector2) -> usize {
    let Some(player_id) = tables.player(sender).map(|player| player.player_id) else {
        return 0;
    };
    let (direction, speed) = parse_direction(direction);
    let circle_ids = tables.circles_of(player_id);
    for circle_id in &circle_ids {
        let Some(mut circle) = tables.circle(*circle_id) else { continue };
        circle.direction = direction;
        circle.speed = speed;
        tables.update_circle(circle);
    }
    circle_ids.len()
}
