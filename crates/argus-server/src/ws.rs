use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde_json::json;
use tracing::debug;

use crate::state::AppState;

/// `GET /ws` — pushes the current snapshot on connect, then one `state_update`
/// per coalesced change thereafter. Replies to client `ping` frames so a
/// thin client doesn't need its own keepalive logic.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.publisher.subscribe();

    let initial = rx.borrow().clone();
    let Ok(text) = serde_json::to_string(&json!({"type": "state_update", "payload": initial}))
    else {
        return;
    };
    if socket.send(Message::Text(text)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                let Ok(text) = serde_json::to_string(&json!({"type": "state_update", "payload": snapshot})) else {
                    continue;
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) if text.contains("\"ping\"") => {
                        if socket.send(Message::Text(r#"{"type":"pong"}"#.to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("websocket error: {e}");
                        break;
                    }
                }
            }
        }
    }
}
