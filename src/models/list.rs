use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{trim_in_place, trim_option, MAX_POSITION};

/// An ordered column within a board.
///
/// Lists sort by ascending `position`. Positions are assigned by the active
/// [`crate::ordering::Positioner`] on creation and are not renumbered when a
/// sibling list is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub title: String,
    pub board_id: Uuid,
    pub position: i64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a list. The position is always computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "List title is required and cannot exceed 100 characters"
    ))]
    pub title: String,
}

impl CreateListInput {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.title);
    }
}

/// Input for updating a list. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "List title is required and cannot exceed 100 characters"
    ))]
    pub title: Option<String>,
    #[validate(range(min = 0, max = MAX_POSITION, message = "Position is out of range"))]
    pub position: Option<i64>,
    pub is_archived: Option<bool>,
}

impl UpdateListInput {
    pub fn normalize(&mut self) {
        trim_option(&mut self.title);
    }
}
