use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use super::events::{ClientFrame, ControlEvent, EventKind};
use crate::auth::validate_token;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Optional bearer token. It only tags the session with a user id; the
    /// socket itself is open.
    pub token: Option<String>,
}

/// Upgrade `GET /api/ws` to a relay session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> impl IntoResponse {
    let user_id = params.token.as_deref().and_then(|token| {
        validate_token(token, &state.config.jwt)
            .map(|claims| claims.sub)
            .map_err(|e| tracing::debug!(error = %e, "Ignoring invalid relay token"))
            .ok()
    });

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Run one session: forward queued messages to the socket on a spawned task
/// and handle inbound frames here until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<Uuid>) {
    let session_id = Uuid::new_v4();
    let rooms = state.rooms.clone();
    let mut rx = rooms.connect(session_id, user_id).await;
    tracing::info!(session_id = %session_id, user_id = ?user_id, "Relay session connected");

    send_control(&state, session_id, ControlEvent::Connected { session_id }).await;

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(session_id = %session_id, "Relay sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => handle_frame(&state, session_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(session_id = %session_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Relay receive error");
                break;
            }
        }
    }

    rooms.disconnect(session_id).await;
    send_task.abort();
    tracing::info!(session_id = %session_id, "Relay session disconnected");
}

async fn handle_frame(state: &AppState, session_id: Uuid, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => {
            send_error(state, session_id, "Malformed frame").await;
            return;
        }
    };

    match frame.event.as_str() {
        "join-board" => match frame.board_id() {
            Some(board_id) => {
                state.rooms.subscribe(session_id, board_id).await;
                tracing::info!(session_id = %session_id, board_id = %board_id, "Joined board");
            }
            None => send_error(state, session_id, "Invalid board id").await,
        },
        "leave-board" => match frame.board_id() {
            Some(board_id) => {
                state.rooms.unsubscribe(session_id, board_id).await;
                tracing::info!(session_id = %session_id, board_id = %board_id, "Left board");
            }
            None => send_error(state, session_id, "Invalid board id").await,
        },
        event => match EventKind::from_str(event) {
            Some(kind) if state.config.client_relay => match frame.board_id() {
                Some(board_id) => {
                    let count = state
                        .rooms
                        .send_to_room(board_id, Message::text(text.to_owned()), Some(session_id))
                        .await;
                    tracing::debug!(
                        session_id = %session_id,
                        board_id = %board_id,
                        event = kind.as_str(),
                        recipients = count,
                        "Relayed client event"
                    );
                }
                None => send_error(state, session_id, "Invalid board id").await,
            },
            Some(kind) => {
                tracing::debug!(
                    session_id = %session_id,
                    event = kind.as_str(),
                    "Client relay disabled, ignoring"
                );
            }
            None => send_error(state, session_id, "Unknown event").await,
        },
    }
}

async fn send_error(state: &AppState, session_id: Uuid, message: &str) {
    let event = ControlEvent::Error {
        message: message.to_string(),
    };
    send_control(state, session_id, event).await;
}

async fn send_control(state: &AppState, session_id: Uuid, event: ControlEvent) {
    match event.to_message() {
        Ok(message) => {
            state.rooms.send_to(session_id, message).await;
        }
        Err(e) => tracing::warn!(error = %e, "Failed to encode control frame"),
    }
}
