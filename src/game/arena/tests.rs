use super::*;
use crate::game::constants::TARGET_FOOD_COUNT;
use crate::game::rules::mass_to_radius;
use crate::game::types::{AccountState, Circle, WorldSnapshot};
use rand::Rng;
use serde_json::Value;
use tokio::sync::mpsc;

async fn initialized_arena(seed: u64) -> Arena {
    let arena = Arena::new(Some(seed));
    arena.init(1000).await.unwrap();
    arena
}

fn next_json(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
    let payload = rx.try_recv().expect("expected a queued message");
    serde_json::from_str(&payload).unwrap()
}

fn latest_state_json(session: &SessionIo) -> Value {
    let payload = session
        .latest_state
        .take_latest()
        .expect("expected a pending state frame");
    serde_json::from_str(&payload).unwrap()
}

fn assert_world_invariants(snapshot: &WorldSnapshot, world_size: f64) {
    let entities: HashMap<_, _> = snapshot
        .entities
        .iter()
        .map(|entity| (entity.entity_id, *entity))
        .collect();
    for entity in &snapshot.entities {
        assert!(entity.mass >= 1);
        let radius = mass_to_radius(entity.mass);
        for axis in [entity.position.x, entity.position.y] {
            assert!(
                axis >= radius && axis <= world_size - radius,
                "entity {} out of bounds at {:?}",
                entity.entity_id,
                entity.position
            );
        }
    }
    for circle in &snapshot.circles {
        assert!(entities.contains_key(&circle.entity_id));
        assert!((0.0..=1.0).contains(&circle.speed));
        let len = crate::game::math::length(circle.direction);
        assert!(len == 0.0 || (len - 1.0).abs() < 1e-9);
    }
    for food in &snapshot.food {
        assert!(entities.contains_key(&food.entity_id));
    }
    assert_eq!(
        snapshot.entities.len(),
        snapshot.circles.len() + snapshot.food.len()
    );
}

#[tokio::test]
async fn init_twice_is_rejected() {
    let arena = initialized_arena(1).await;
    assert_eq!(arena.init(500).await, Err(UnitError::AlreadyInitialized));
    assert_eq!(
        arena.state.lock().await.store.tables().config(),
        Ok(Config { world_size: 1000 })
    );
}

#[tokio::test]
async fn uninitialized_world_rolls_back_enter_game() {
    let arena = Arena::new(Some(1));
    let identity = Identity::new_random();
    arena.connect(identity).await.unwrap();

    let result = arena.enter_game(identity, "ghost".to_string()).await;

    assert_eq!(result, Err(UnitError::ConfigMissing));
    let snapshot = arena.snapshot().await;
    assert_eq!(snapshot.players[0].name, "");
    assert!(snapshot.circles.is_empty());
    assert!(snapshot.entities.is_empty());
}

#[tokio::test]
async fn zero_circle_tick_changes_nothing() {
    let arena = initialized_arena(2).await;
    arena.connect(Identity::new_random()).await.unwrap();
    arena.spawn_food().await.unwrap();
    let before = arena.snapshot().await;

    let report = arena.move_all_players().await.unwrap();

    let after = arena.snapshot().await;
    assert_eq!(report, TickReport::default());
    assert_eq!(before.entities, after.entities);
    assert_eq!(before.food, after.food);
}

#[tokio::test]
async fn food_only_spawns_once_someone_is_connected() {
    let arena = initialized_arena(3).await;
    assert_eq!(arena.spawn_food().await, Ok(0));

    let identity = Identity::new_random();
    arena.connect(identity).await.unwrap();
    assert_eq!(arena.spawn_food().await, Ok(TARGET_FOOD_COUNT));
    assert_eq!(arena.spawn_food().await, Ok(0));
}

#[tokio::test]
async fn full_account_lifecycle() {
    let arena = initialized_arena(4).await;
    let identity = Identity::new_random();
    assert_eq!(arena.account_state(identity).await, AccountState::Disconnected);

    let player = arena.connect(identity).await.unwrap();
    assert_eq!(arena.account_state(identity).await, AccountState::ConnectedNoName);

    let circle = arena.enter_game(identity, "Ada".to_string()).await.unwrap();
    assert_eq!(arena.account_state(identity).await, AccountState::InGame);

    assert_eq!(
        arena
            .update_player_input(identity, Vector2::new(1.0, 0.0))
            .await,
        1
    );
    arena.move_all_players().await.unwrap();
    let snapshot = arena.snapshot().await;
    let moved = snapshot
        .entities
        .iter()
        .find(|entity| entity.entity_id == circle.entity_id)
        .unwrap();
    let radius = mass_to_radius(circle.mass);
    let expected_x = (circle.position.x + 10.0).min(1000.0 - radius);
    assert!((moved.position.x - expected_x).abs() < 1e-9);

    arena.disconnect(identity).await.unwrap();
    assert_eq!(arena.account_state(identity).await, AccountState::Disconnected);
    assert!(arena.snapshot().await.entities.is_empty());

    let late = arena
        .update_player_input(identity, Vector2::new(0.0, 1.0))
        .await;
    assert_eq!(late, 0);

    let back = arena.connect(identity).await.unwrap();
    assert_eq!(back.player_id, player.player_id);
    assert_eq!(back.name, "Ada");
}

#[tokio::test]
async fn disconnect_without_connect_is_rejected() {
    let arena = initialized_arena(5).await;
    let identity = Identity::new_random();
    assert_eq!(
        arena.disconnect(identity).await,
        Err(UnitError::PlayerNotFound(identity))
    );
}

#[tokio::test]
async fn session_receives_welcome_and_state() {
    let arena = initialized_arena(6).await;
    let identity = Identity::new_random();

    let mut session = arena.open_session(identity).await.unwrap();
    let session_id = session.session_id.clone();

    let welcome = next_json(&mut session.control_rx);
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["identity"], identity.to_string());
    assert_eq!(welcome["playerId"], 1);
    assert_eq!(welcome["worldSize"], 1000);
    assert_eq!(welcome["accountState"], "connectedNoName");
    assert!(session.latest_state.take_latest().is_none());

    arena
        .handle_text_message(&session_id, r#"{"type":"enterGame","name":"  Big   Blob "}"#)
        .await;
    arena
        .handle_text_message(&session_id, r#"{"type":"input","direction":{"x":0,"y":-0.5}}"#)
        .await;
    arena.move_all_players().await.unwrap();

    let state = latest_state_json(&session);
    assert_eq!(state["type"], "state");
    assert_eq!(state["players"][0]["name"], "Big Blob");
    assert_eq!(state["circles"][0]["speed"], 0.5);
    assert_eq!(state["circles"][0]["direction"]["y"], -1.0);
}

#[tokio::test]
async fn malformed_messages_are_ignored() {
    let arena = initialized_arena(7).await;
    let mut session = arena.open_session(Identity::new_random()).await.unwrap();
    let session_id = session.session_id.clone();
    next_json(&mut session.control_rx);

    arena.handle_text_message(&session_id, "{").await;
    arena
        .handle_text_message(&session_id, r#"{"type":"input"}"#)
        .await;

    assert!(session.control_rx.try_recv().is_err());
    assert!(arena.snapshot().await.circles.is_empty());
}

#[tokio::test]
async fn second_session_for_same_identity_is_refused() {
    let arena = initialized_arena(8).await;
    let identity = Identity::new_random();
    let _session = arena.open_session(identity).await.unwrap();

    assert_eq!(
        arena.open_session(identity).await.err(),
        Some(UnitError::AlreadyConnected(identity))
    );
}

#[tokio::test]
async fn closing_session_logs_player_out() {
    let arena = initialized_arena(9).await;
    let identity = Identity::new_random();
    let session = arena.open_session(identity).await.unwrap();
    let session_id = session.session_id.clone();
    arena
        .handle_text_message(&session_id, r#"{"type":"enterGame","name":"x"}"#)
        .await;

    arena.close_session(&session_id).await;

    assert_eq!(arena.account_state(identity).await, AccountState::Disconnected);
    assert!(arena.snapshot().await.circles.is_empty());
    arena.close_session(&session_id).await;
}

#[tokio::test]
async fn dropped_receiver_is_pruned_on_broadcast() {
    let arena = initialized_arena(10).await;
    let identity = Identity::new_random();
    let session = arena.open_session(identity).await.unwrap();
    drop(session);

    arena.move_all_players().await.unwrap();

    assert!(arena.state.lock().await.sessions.is_empty());
    assert_eq!(arena.account_state(identity).await, AccountState::Disconnected);
}

#[tokio::test]
async fn long_random_session_keeps_world_consistent() {
    let arena = initialized_arena(11).await;
    let identities: Vec<Identity> = (0..6).map(|_| Identity::new_random()).collect();
    for identity in &identities {
        arena.connect(*identity).await.unwrap();
        arena
            .enter_game(*identity, "bot".to_string())
            .await
            .unwrap();
    }
    let mut rng = StdRng::seed_from_u64(99);

    for step in 0..300 {
        if step % 10 == 0 {
            arena.spawn_food().await.unwrap();
        }
        for identity in &identities {
            let direction = Vector2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
            arena.update_player_input(*identity, direction).await;
        }
        arena.move_all_players().await.unwrap();
        assert_world_invariants(&arena.snapshot().await, 1000.0);
    }

    for identity in &identities {
        arena.disconnect(*identity).await.unwrap();
    }
    let snapshot = arena.snapshot().await;
    assert!(snapshot.circles.is_empty());
    assert!(snapshot.players.is_empty());
    assert_eq!(snapshot.entities.len(), snapshot.food.len());
}

#[tokio::test]
async fn state_frames_never_carry_identities() {
    let arena = initialized_arena(12).await;
    let first = Identity::new_random();
    let second = Identity::new_random();
    let watcher = arena.open_session(first).await.unwrap();
    let other = arena.open_session(second).await.unwrap();
    for session in [&watcher, &other] {
        arena
            .handle_text_message(&session.session_id, r#"{"type":"enterGame","name":"n"}"#)
            .await;
    }

    arena.move_all_players().await.unwrap();

    let payload = watcher.latest_state.take_latest().unwrap();
    assert!(!payload.contains(&first.to_string()));
    assert!(!payload.contains(&second.to_string()));
    let state: Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(state["players"].as_array().unwrap().len(), 2);
    assert!(state["players"][0].get("identity").is_none());
}

#[tokio::test]
async fn undrained_session_holds_only_the_newest_state() {
    let arena = initialized_arena(13).await;
    let mut session = arena.open_session(Identity::new_random()).await.unwrap();
    arena
        .handle_text_message(&session.session_id, r#"{"type":"enterGame","name":"idle"}"#)
        .await;

    for _ in 0..50 {
        arena.move_all_players().await.unwrap();
    }
    arena.spawn_food().await.unwrap();
    arena.move_all_players().await.unwrap();

    let state = latest_state_json(&session);
    let current = arena.snapshot().await;
    assert!(!current.food.is_empty());
    assert_eq!(state["food"].as_array().unwrap().len(), current.food.len());
    assert!(session.latest_state.take_latest().is_none());
    assert_eq!(next_json(&mut session.control_rx)["type"], "welcome");
    assert!(session.control_rx.try_recv().is_err());
}

#[tokio::test]
async fn closing_session_with_orphaned_circle_still_logs_out() {
    let arena = initialized_arena(14).await;
    let identity = Identity::new_random();
    let session = arena.open_session(identity).await.unwrap();
    arena
        .handle_text_message(&session.session_id, r#"{"type":"enterGame","name":"o"}"#)
        .await;
    {
        let mut state = arena.state.lock().await;
        let player_id = state.store.tables().player(identity).unwrap().player_id;
        state
            .store
            .transact(|tables| {
                tables.insert_circle(Circle {
                    entity_id: 9_999,
                    player_id,
                    direction: Vector2::ZERO,
                    speed: 0.0,
                    last_split_time: 0,
                });
                Ok(())
            })
            .unwrap();
    }

    arena.close_session(&session.session_id).await;

    assert_eq!(arena.account_state(identity).await, AccountState::Disconnected);
    let snapshot = arena.snapshot().await;
    assert!(snapshot.circles.is_empty());
    assert!(snapshot.entities.is_empty());
    let again = arena.open_session(identity).await.unwrap();
    assert!(arena.state.lock().await.sessions.contains_key(&again.session_id));
}
