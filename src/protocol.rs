use crate::game::types::{
  AccountState, Circle, Entity, Food, Identity, Player, PlayerId, Vector2, WorldSnapshot,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
  #[serde(rename = "enterGame")]
  EnterGame { name: Option<String> },
  #[serde(rename = "input")]
  Input { direction: Option<Vector2> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
  #[serde(rename = "welcome")]
  Welcome {
    identity: Identity,
    #[serde(rename = "playerId")]
    player_id: PlayerId,
    name: String,
    #[serde(rename = "worldSize")]
    world_size: u64,
    #[serde(rename = "accountState")]
    account_state: AccountState,
  },
  #[serde(rename = "state")]
  State {
    entities: Vec<Entity>,
    circles: Vec<Circle>,
    food: Vec<Food>,
    players: Vec<Player>,
  },
  #[serde(rename = "error")]
  Error { message: String },
}

impl From<WorldSnapshot> for ServerMessage {
  fn from(snapshot: WorldSnapshot) -> Self {
    ServerMessage::State {
      entities: snapshot.entities,
      circles: snapshot.circles,
      food: snapshot.food,
      players: snapshot.players,
    }
  }
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

pub fn encode_server_message(message: &ServerMessage) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(?error, "failed to encode server message");
      None
    }
  }
}
