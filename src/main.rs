use axum::{
  extract::{Query, State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod protocol;
mod shared;
mod transport;

use app::config::ServerConfig;
use game::arena::Arena;
use game::types::Identity;

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Deserialize)]
struct ArenaQuery {
  identity: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env();
  let arena = Arc::new(Arena::new(config.rng_seed));
  arena.init(config.world_size).await?;
  arena.start(config.move_tick, config.food_tick);

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/arena", get(ws_handler))
    .layer(cors)
    .with_state(arena);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Query(params): Query<ArenaQuery>,
  State(arena): State<Arc<Arena>>,
) -> impl IntoResponse {
  let identity = params
    .identity
    .as_deref()
    .and_then(Identity::parse)
    .unwrap_or_else(Identity::new_random);
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, arena, identity))
}
