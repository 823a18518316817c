use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An audit record of a mutation on a board.
///
/// Activities are a side channel: they are written after the mutation they
/// describe and a failure to write one never fails that mutation. They are
/// deleted together with their board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub target_type: TargetType,
    pub target_id: Uuid,
    /// Free-form payload, usually the request body or a title.
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// What kind of mutation an activity records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    CreateBoard,
    UpdateBoard,
    DeleteBoard,
    CreateList,
    UpdateList,
    DeleteList,
    CreateTask,
    UpdateTask,
    DeleteTask,
    MoveTask,
    AssignUser,
    UnassignUser,
    AddMember,
    RemoveMember,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateBoard => "create_board",
            Self::UpdateBoard => "update_board",
            Self::DeleteBoard => "delete_board",
            Self::CreateList => "create_list",
            Self::UpdateList => "update_list",
            Self::DeleteList => "delete_list",
            Self::CreateTask => "create_task",
            Self::UpdateTask => "update_task",
            Self::DeleteTask => "delete_task",
            Self::MoveTask => "move_task",
            Self::AssignUser => "assign_user",
            Self::UnassignUser => "unassign_user",
            Self::AddMember => "add_member",
            Self::RemoveMember => "remove_member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create_board" => Some(Self::CreateBoard),
            "update_board" => Some(Self::UpdateBoard),
            "delete_board" => Some(Self::DeleteBoard),
            "create_list" => Some(Self::CreateList),
            "update_list" => Some(Self::UpdateList),
            "delete_list" => Some(Self::DeleteList),
            "create_task" => Some(Self::CreateTask),
            "update_task" => Some(Self::UpdateTask),
            "delete_task" => Some(Self::DeleteTask),
            "move_task" => Some(Self::MoveTask),
            "assign_user" => Some(Self::AssignUser),
            "unassign_user" => Some(Self::UnassignUser),
            "add_member" => Some(Self::AddMember),
            "remove_member" => Some(Self::RemoveMember),
            _ => None,
        }
    }
}

/// The kind of entity an activity targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetType {
    Board,
    List,
    Task,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "Board",
            Self::List => "List",
            Self::Task => "Task",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Board" => Some(Self::Board),
            "List" => Some(Self::List),
            "Task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Input for recording an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub details: serde_json::Value,
}

impl NewActivity {
    pub fn new(
        board_id: Uuid,
        user_id: Uuid,
        action: ActivityAction,
        target_type: TargetType,
        target_id: Uuid,
    ) -> Self {
        Self {
            board_id,
            user_id,
            action,
            target_type,
            target_id,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
