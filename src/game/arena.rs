use super::error::UnitError;
use super::input::update_player_input;
use super::lifecycle;
use super::spawner::spawn_food;
use super::store::WorldStore;
use super::tick::{move_all_players, TickReport};
use super::types::{Config, Entity, Identity, Player, Vector2};
use crate::app::time::now_millis;
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::shared::names::sanitize_player_name;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Mutex;
use uuid::Uuid;

mod session;

use session::LatestFrame;
pub use session::SessionIo;

/// One world plus the sessions watching it.
///
/// Every public method is a single unit of work: it holds the world lock for
/// its whole duration and commits only if it succeeds.
#[derive(Debug)]
pub struct Arena {
  state: Mutex<ArenaState>,
  running: AtomicBool,
}

#[derive(Debug)]
struct SessionEntry {
  control: UnboundedSender<String>,
  state: Arc<LatestFrame>,
  identity: Identity,
}

#[derive(Debug)]
struct ArenaState {
  store: WorldStore,
  rng: StdRng,
  sessions: HashMap<String, SessionEntry>,
}

impl Arena {
  pub fn new(rng_seed: Option<u64>) -> Self {
    let rng = match rng_seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Self {
      state: Mutex::new(ArenaState {
        store: WorldStore::new(),
        rng,
        sessions: HashMap::new(),
      }),
      running: AtomicBool::new(false),
    }
  }

  pub async fn init(&self, world_size: u64) -> Result<(), UnitError> {
    tracing::info!(world_size, "initializing arena");
    let mut state = self.state.lock().await;
    state.store.transact(|tables| {
      if tables.has_config() {
        return Err(UnitError::AlreadyInitialized);
      }
      tables.set_config(Config { world_size });
      Ok(())
    })
  }

  /// Spawns the movement and food schedules. Later calls are no-ops.
  pub fn start(self: &Arc<Self>, move_period: Duration, food_period: Duration) {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return;
    }

    let arena = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(move_period);
      loop {
        interval.tick().await;
        if let Err(error) = arena.move_all_players().await {
          log_unit_failure("move_all_players", &error);
        }
      }
    });

    let arena = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(food_period);
      loop {
        interval.tick().await;
        if let Err(error) = arena.spawn_food().await {
          log_unit_failure("spawn_food", &error);
        }
      }
    });
  }

  pub async fn move_all_players(&self) -> Result<TickReport, UnitError> {
    let mut state = self.state.lock().await;
    let report = state.move_all_players()?;
    state.broadcast_state();
    Ok(report)
  }

  pub async fn spawn_food(&self) -> Result<usize, UnitError> {
    self.state.lock().await.spawn_food()
  }

  /// Connects `identity` and registers a session that receives world updates.
  pub async fn open_session(&self, identity: Identity) -> Result<SessionIo, UnitError> {
    let mut state = self.state.lock().await;
    let world_size = state.store.tables().config()?.world_size;
    let player = state.connect(identity)?;

    let (control, control_rx) = mpsc::unbounded_channel();
    let latest_state = Arc::new(LatestFrame::new());
    let session_id = Uuid::new_v4().to_string();
    send_message(
      &control,
      &ServerMessage::Welcome {
        identity,
        player_id: player.player_id,
        name: player.name,
        world_size,
        account_state: lifecycle::account_state(state.store.tables(), identity),
      },
    );
    state.sessions.insert(
      session_id.clone(),
      SessionEntry {
        control,
        state: Arc::clone(&latest_state),
        identity,
      },
    );
    Ok(SessionIo {
      session_id,
      control_rx,
      latest_state,
    })
  }

  pub async fn close_session(&self, session_id: &str) {
    let mut state = self.state.lock().await;
    state.disconnect_session(session_id);
  }

  pub async fn handle_text_message(&self, session_id: &str, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else { return };
    let mut state = self.state.lock().await;
    let Some(identity) = state.session_identity(session_id) else { return };

    let result = match message {
      ClientMessage::EnterGame { name } => {
        let name = sanitize_player_name(name.as_deref().unwrap_or_default());
        state.enter_game(identity, name).map(|_| ())
      }
      ClientMessage::Input { direction } => {
        let Some(direction) = direction else { return };
        state.update_player_input(identity, direction);
        Ok(())
      }
    };

    if let Err(error) = result {
      log_unit_failure("client_event", &error);
      state.send_to(
        session_id,
        &ServerMessage::Error {
          message: error.to_string(),
        },
      );
    }
  }
}

#[cfg(test)]
impl Arena {
  pub async fn connect(&self, identity: Identity) -> Result<Player, UnitError> {
    self.state.lock().await.connect(identity)
  }

  pub async fn disconnect(&self, identity: Identity) -> Result<Player, UnitError> {
    self.state.lock().await.disconnect(identity)
  }

  pub async fn enter_game(&self, identity: Identity, name: String) -> Result<Entity, UnitError> {
    self.state.lock().await.enter_game(identity, name)
  }

  pub async fn update_player_input(&self, identity: Identity, direction: Vector2) -> usize {
    self.state.lock().await.update_player_input(identity, direction)
  }

  pub async fn account_state(&self, identity: Identity) -> super::types::AccountState {
    let state = self.state.lock().await;
    lifecycle::account_state(state.store.tables(), identity)
  }

  pub async fn snapshot(&self) -> super::types::WorldSnapshot {
    self.state.lock().await.store.tables().snapshot()
  }
}

impl ArenaState {
  fn connect(&mut self, identity: Identity) -> Result<Player, UnitError> {
    self
      .store
      .transact(|tables| lifecycle::connect(tables, identity))
  }

  fn disconnect(&mut self, identity: Identity) -> Result<Player, UnitError> {
    self
      .store
      .transact(|tables| lifecycle::disconnect(tables, identity))
  }

  fn enter_game(&mut self, identity: Identity, name: String) -> Result<Entity, UnitError> {
    let now = now_millis();
    let ArenaState { store, rng, .. } = self;
    store.transact(|tables| lifecycle::enter_game(tables, rng, identity, name, now))
  }

  fn update_player_input(&mut self, identity: Identity, direction: Vector2) -> usize {
    self
      .store
      .apply(|tables| update_player_input(tables, identity, direction))
  }

  fn move_all_players(&mut self) -> Result<TickReport, UnitError> {
    let report = self.store.transact(move_all_players)?;
    if report.food_eaten > 0 || report.circles_eaten > 0 {
      tracing::debug!(
        circles_moved = report.circles_moved,
        food_eaten = report.food_eaten,
        circles_eaten = report.circles_eaten,
        "tick consumed entities"
      );
    }
    Ok(report)
  }

  fn spawn_food(&mut self) -> Result<usize, UnitError> {
    let ArenaState { store, rng, .. } = self;
    store.transact(|tables| spawn_food(tables, rng))
  }

  fn session_identity(&self, session_id: &str) -> Option<Identity> {
    self.sessions.get(session_id).map(|entry| entry.identity)
  }

  fn disconnect_session(&mut self, session_id: &str) {
    let Some(entry) = self.sessions.remove(session_id) else { return };
    let identity = entry.identity;
    let Err(error) = self.disconnect(identity) else { return };
    log_unit_failure("disconnect", &error);
    if !error.is_invariant_violation() {
      return;
    }
    if let Err(error) = self
      .store
      .transact(|tables| lifecycle::evict(tables, identity))
    {
      log_unit_failure("evict", &error);
    }
  }

  fn send_to(&self, session_id: &str, message: &ServerMessage) {
    if let Some(entry) = self.sessions.get(session_id) {
      send_message(&entry.control, message);
    }
  }

  fn broadcast_state(&mut self) {
    if self.sessions.is_empty() {
      return;
    }
    let message = ServerMessage::from(self.store.tables().snapshot());
    let Some(payload) = protocol::encode_server_message(&message) else { return };
    let mut stale = Vec::new();
    for (session_id, session) in &self.sessions {
      if session.control.is_closed() {
        stale.push(session_id.clone());
      } else {
        session.state.store(payload.clone());
      }
    }
    for session_id in stale {
      self.disconnect_session(&session_id);
    }
  }
}

fn send_message(sender: &UnboundedSender<String>, message: &ServerMessage) -> bool {
  match protocol::encode_server_message(message) {
    Some(payload) => sender.send(payload).is_ok(),
    None => false,
  }
}

fn log_unit_failure(unit: &str, error: &UnitError) {
  if error.is_invariant_violation() {
    tracing::error!(unit, %error, "unit aborted on invariant violation");
  } else {
    tracing::warn!(unit, %error, "unit rejected");
  }
}

#[cfg(test)]
mod tests;
