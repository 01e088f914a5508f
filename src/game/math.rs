use super::types::Vector2;

pub fn length(v: Vector2) -> f64 {
  (v.x * v.x + v.y * v.y).sqrt()
}

pub fn normalize(v: Vector2) -> Vector2 {
  let len = length(v);
  if !len.is_finite() || len == 0.0 {
    return Vector2::ZERO;
  }
  Vector2 {
    x: v.x / len,
    y: v.y / len,
  }
}

pub fn add(a: Vector2, b: Vector2) -> Vector2 {
  Vector2 {
    x: a.x + b.x,
    y: a.y + b.y,
  }
}

pub fn scale(v: Vector2, factor: f64) -> Vector2 {
  Vector2 {
    x: v.x * factor,
    y: v.y * factor,
  }
}

pub fn distance_sq(a: Vector2, b: Vector2) -> f64 {
  let dx = a.x - b.x;
  let dy = a.y - b.y;
  dx * dx + dy * dy
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}
