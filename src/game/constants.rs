pub const DEFAULT_WORLD_SIZE: u64 = 1000;
pub const MOVE_TICK_MS: u64 = 50;
pub const FOOD_TICK_MS: u64 = 500;

pub const START_PLAYER_MASS: u32 = 15;
pub const START_PLAYER_SPEED: f64 = 10.0;
pub const MINIMUM_SAFE_MASS_RATIO: f64 = 0.85;

pub const FOOD_MASS_MIN: u32 = 2;
pub const FOOD_MASS_MAX: u32 = 4;
pub const TARGET_FOOD_COUNT: usize = 600;

pub const SPAWN_DIRECTION: (f64, f64) = (0.0, 1.0);
