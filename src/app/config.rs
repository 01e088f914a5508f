use crate::game::constants::{DEFAULT_WORLD_SIZE, FOOD_TICK_MS, MOVE_TICK_MS};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub world_size: u64,
    pub move_tick: Duration,
    pub food_tick: Duration,
    pub rng_seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_u64 = |key: &str| {
            lookup(key)
                .and_then(|value| value.trim().parse::<u64>().ok())
        };

        let port = lookup("PORT")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(8787);
        let world_size = parse_u64("WORLD_SIZE")
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_WORLD_SIZE);
        let move_tick_ms = parse_u64("MOVE_TICK_MS")
            .filter(|value| *value > 0)
            .unwrap_or(MOVE_TICK_MS);
        let food_tick_ms = parse_u64("FOOD_TICK_MS")
            .filter(|value| *value > 0)
            .unwrap_or(FOOD_TICK_MS);

        Self {
            port,
            world_size,
            move_tick: Duration::from_millis(move_tick_ms),
            food_tick: Duration::from_millis(food_tick_ms),
            rng_seed: parse_u64("RNG_SEED"),
        }
    }
}
