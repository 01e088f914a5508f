pub mod arena;
pub mod constants;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod math;
pub mod rules;
pub mod spawner;
pub mod store;
pub mod tick;
pub mod types;
