use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::events::BoardEvent;

/// Channel sender half for pushing messages to a WebSocket session.
pub type SessionSender = mpsc::UnboundedSender<Message>;

/// One connected WebSocket client.
struct Session {
    /// Set when the client presented a valid token on connect.
    user_id: Option<Uuid>,
    sender: SessionSender,
    rooms: HashSet<Uuid>,
    connected_at: DateTime<Utc>,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, Session>,
    /// board id -> session ids currently joined to it.
    rooms: HashMap<Uuid, HashSet<Uuid>>,
}

/// Tracks WebSocket sessions and the board rooms they have joined.
///
/// Each session owns an unbounded channel, so sending never waits on a slow
/// client and messages to one session keep their order. Delivery is best
/// effort: a session that is not in the room when an event is sent never
/// sees it. Wrap in `Arc` and share across the application.
pub struct RoomManager {
    inner: RwLock<Registry>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Register a session. Returns the receiver half of its outbound channel.
    pub async fn connect(
        &self,
        session_id: Uuid,
        user_id: Option<Uuid>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            user_id,
            sender: tx,
            rooms: HashSet::new(),
            connected_at: Utc::now(),
        };
        self.inner.write().await.sessions.insert(session_id, session);
        rx
    }

    /// Join a board room. Joining twice is a no-op. Returns `false` if the
    /// session is unknown.
    pub async fn subscribe(&self, session_id: Uuid, board_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.sessions.get_mut(&session_id) else {
            return false;
        };
        session.rooms.insert(board_id);
        inner.rooms.entry(board_id).or_default().insert(session_id);
        true
    }

    /// Leave a board room. No-op if the session never joined it.
    pub async fn unsubscribe(&self, session_id: Uuid, board_id: Uuid) {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.sessions.get_mut(&session_id) {
            session.rooms.remove(&board_id);
        }
        remove_from_room(&mut inner.rooms, board_id, session_id);
    }

    /// Drop a session and remove it from every room it joined.
    pub async fn disconnect(&self, session_id: Uuid) {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.sessions.remove(&session_id) else {
            return;
        };
        for board_id in session.rooms {
            remove_from_room(&mut inner.rooms, board_id, session_id);
        }
        tracing::debug!(
            session_id = %session_id,
            user_id = ?session.user_id,
            connected_secs = (Utc::now() - session.connected_at).num_seconds(),
            "Session removed"
        );
    }

    /// Send `event` to every session in its board's room except `exclude`.
    ///
    /// Returns the number of sessions the event was queued for. An empty
    /// room is not an error.
    pub async fn broadcast(&self, event: &BoardEvent, exclude: Option<Uuid>) -> usize {
        let message = match event.to_message() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(event = event.kind().as_str(), error = %e, "Failed to encode event");
                return 0;
            }
        };
        let count = self.send_to_room(event.board_id(), message, exclude).await;
        tracing::debug!(
            board_id = %event.board_id(),
            event = event.kind().as_str(),
            recipients = count,
            "Broadcast"
        );
        count
    }

    /// Send a raw message to every session in a room except `exclude`.
    pub async fn send_to_room(
        &self,
        board_id: Uuid,
        message: Message,
        exclude: Option<Uuid>,
    ) -> usize {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(&board_id) else {
            return 0;
        };

        let mut count = 0;
        for session_id in members {
            if Some(*session_id) == exclude {
                continue;
            }
            if let Some(session) = inner.sessions.get(session_id) {
                if session.sender.send(message.clone()).is_ok() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Send a message to one session. Returns `false` if it is gone.
    pub async fn send_to(&self, session_id: Uuid, message: Message) -> bool {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&session_id)
            .is_some_and(|s| s.sender.send(message).is_ok())
    }

    pub async fn room_size(&self, board_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(&board_id)
            .map_or(0, HashSet::len)
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Whether `session_id` is currently in the room for `board_id`.
    pub async fn is_subscribed(&self, session_id: Uuid, board_id: Uuid) -> bool {
        self.inner
            .read()
            .await
            .rooms
            .get(&board_id)
            .is_some_and(|m| m.contains(&session_id))
    }

    /// Send a Ping frame to every session.
    pub async fn ping_all(&self) {
        let inner = self.inner.read().await;
        for session in inner.sessions.values() {
            let _ = session.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every session, then forget them all.
    pub async fn shutdown_all(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.sessions.len();
        for session in inner.sessions.values() {
            let _ = session.sender.send(Message::Close(None));
        }
        inner.sessions.clear();
        inner.rooms.clear();
        tracing::info!(count, "Closed all relay sessions");
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_from_room(rooms: &mut HashMap<Uuid, HashSet<Uuid>>, board_id: Uuid, session_id: Uuid) {
    if let Some(members) = rooms.get_mut(&board_id) {
        members.remove(&session_id);
        if members.is_empty() {
            rooms.remove(&board_id);
        }
    }
}
