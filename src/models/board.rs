use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_nullable_length, nullable, trim_in_place, trim_nullable, trim_option};

/// Background color given to boards created without one.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#0079bf";

/// A board holding ordered lists of tasks.
///
/// The owner is fixed at creation and is the only user allowed to update or
/// delete the board or add members. Members (the owner included) may read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner: Uuid,
    /// Member user ids in the order they joined. The owner is the first member.
    pub members: Vec<Uuid>,
    pub background_color: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }

    /// Owner or member.
    pub fn has_access(&self, user_id: Uuid) -> bool {
        self.is_owner(user_id) || self.members.contains(&user_id)
    }
}

/// Input for creating a board.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Board title is required and cannot exceed 100 characters"
    ))]
    pub title: String,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub background_color: Option<String>,
}

impl CreateBoardInput {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.title);
        trim_option(&mut self.description);
    }
}

/// Input for updating a board. All fields are optional for partial updates;
/// `description: null` clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_board_description"))]
pub struct UpdateBoardInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Board title is required and cannot exceed 100 characters"
    ))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub background_color: Option<String>,
    pub is_archived: Option<bool>,
}

impl UpdateBoardInput {
    pub fn normalize(&mut self) {
        trim_option(&mut self.title);
        trim_nullable(&mut self.description);
    }
}

fn validate_board_description(input: &UpdateBoardInput) -> Result<(), ValidationError> {
    check_nullable_length(
        &input.description,
        500,
        "description",
        "Description cannot exceed 500 characters",
    )
}

/// Input for adding a member to a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    pub user_id: Uuid,
}
