//! Frames exchanged over the board relay socket.
//!
//! Every frame is a JSON text message shaped `{"event": <name>, "data": ...}`.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Board, List, Task};

/// A board mutation fanned out to the board's room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum BoardEvent {
    BoardUpdated {
        board_id: Uuid,
        board: Board,
    },
    ListCreated {
        board_id: Uuid,
        list: List,
    },
    ListUpdated {
        board_id: Uuid,
        list: List,
    },
    ListDeleted {
        board_id: Uuid,
        list_id: Uuid,
    },
    TaskCreated {
        board_id: Uuid,
        task: Task,
    },
    TaskUpdated {
        board_id: Uuid,
        task: Task,
    },
    TaskMoved {
        board_id: Uuid,
        task_id: Uuid,
        from: Uuid,
        to: Uuid,
        position: i64,
        task: Task,
    },
    TaskDeleted {
        board_id: Uuid,
        task_id: Uuid,
        list_id: Uuid,
    },
    MemberAssigned {
        board_id: Uuid,
        user_id: Uuid,
        board: Board,
    },
}

impl BoardEvent {
    /// The room this event belongs to.
    pub fn board_id(&self) -> Uuid {
        match self {
            Self::BoardUpdated { board_id, .. }
            | Self::ListCreated { board_id, .. }
            | Self::ListUpdated { board_id, .. }
            | Self::ListDeleted { board_id, .. }
            | Self::TaskCreated { board_id, .. }
            | Self::TaskUpdated { board_id, .. }
            | Self::TaskMoved { board_id, .. }
            | Self::TaskDeleted { board_id, .. }
            | Self::MemberAssigned { board_id, .. } => *board_id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::BoardUpdated { .. } => EventKind::BoardUpdated,
            Self::ListCreated { .. } => EventKind::ListCreated,
            Self::ListUpdated { .. } => EventKind::ListUpdated,
            Self::ListDeleted { .. } => EventKind::ListDeleted,
            Self::TaskCreated { .. } => EventKind::TaskCreated,
            Self::TaskUpdated { .. } => EventKind::TaskUpdated,
            Self::TaskMoved { .. } => EventKind::TaskMoved,
            Self::TaskDeleted { .. } => EventKind::TaskDeleted,
            Self::MemberAssigned { .. } => EventKind::MemberAssigned,
        }
    }

    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::text(serde_json::to_string(self)?))
    }
}

/// Names of the broadcast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BoardUpdated,
    ListCreated,
    ListUpdated,
    ListDeleted,
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
    MemberAssigned,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoardUpdated => "board-updated",
            Self::ListCreated => "list-created",
            Self::ListUpdated => "list-updated",
            Self::ListDeleted => "list-deleted",
            Self::TaskCreated => "task-created",
            Self::TaskUpdated => "task-updated",
            Self::TaskMoved => "task-moved",
            Self::TaskDeleted => "task-deleted",
            Self::MemberAssigned => "member-assigned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "board-updated" => Some(Self::BoardUpdated),
            "list-created" => Some(Self::ListCreated),
            "list-updated" => Some(Self::ListUpdated),
            "list-deleted" => Some(Self::ListDeleted),
            "task-created" => Some(Self::TaskCreated),
            "task-updated" => Some(Self::TaskUpdated),
            "task-moved" => Some(Self::TaskMoved),
            "task-deleted" => Some(Self::TaskDeleted),
            "member-assigned" => Some(Self::MemberAssigned),
            _ => None,
        }
    }
}

/// Frames the server sends on its own behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ControlEvent {
    Connected { session_id: Uuid },
    Error { message: String },
}

impl ControlEvent {
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::text(serde_json::to_string(self)?))
    }
}

/// An inbound frame before its event name is interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl ClientFrame {
    /// The board a frame refers to: either `data` itself as a string, or
    /// `data.boardId`.
    pub fn board_id(&self) -> Option<Uuid> {
        let raw = match &self.data {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("boardId")?.as_str()?,
            _ => return None,
        };
        Uuid::parse_str(raw.trim()).ok()
    }
}
