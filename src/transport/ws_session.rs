use crate::game::arena::Arena;
use crate::game::types::Identity;
use crate::protocol::{encode_server_message, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

pub async fn handle_socket(socket: WebSocket, arena: Arc<Arena>, identity: Identity) {
    let (mut sender, mut receiver) = socket.split();

    let session = match arena.open_session(identity).await {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!(%identity, %error, "refusing session");
            let message = ServerMessage::Error {
                message: error.to_string(),
            };
            if let Some(payload) = encode_server_message(&message) {
                let _ = sender.send(Message::Text(payload)).await;
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    let session_id = session.session_id;
    let latest_state = session.latest_state;
    let mut control_rx = session.control_rx;
    tracing::debug!(%identity, %session_id, "session opened");

    let send_task = tokio::spawn(async move {
        use std::collections::VecDeque;

        let mut pending_control: VecDeque<String> = VecDeque::new();

        loop {
            tokio::select! {
                Some(payload) = control_rx.recv() => {
                    pending_control.push_back(payload);
                }
                _ = latest_state.wait_for_update() => {}
            }

            while let Ok(payload) = control_rx.try_recv() {
                pending_control.push_back(payload);
            }

            // Welcome goes out before the first state frame.
            while let Some(payload) = pending_control.pop_front() {
                if sender.send(Message::Text(payload)).await.is_err() {
                    return;
                }
            }

            if let Some(payload) = latest_state.take_latest() {
                if sender.send(Message::Text(payload)).await.is_err() {
                    return;
                }
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                arena.handle_text_message(&session_id, &text).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    arena.close_session(&session_id).await;
    send_task.abort();
    tracing::debug!(%identity, %session_id, "session closed");
}
