use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{
    check_nullable_length, nullable, trim_in_place, trim_nullable, trim_option, MAX_POSITION,
};

/// A unit of work within a list.
///
/// `board_id` is copied from the owning list when the task is created and is
/// not rewritten when the task moves. Moves are expected to stay within one
/// board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub list_id: Uuid,
    pub board_id: Uuid,
    pub assigned_to: Vec<Uuid>,
    /// Ordering key within the owning list.
    pub position: i64,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub is_archived: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How urgent a task is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Input for creating a task within a list.
///
/// The list, board, position, and creator are filled in server-side.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Task title is required and cannot exceed 200 characters"
    ))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<Uuid>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl CreateTaskInput {
    /// Input with just a title, everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            assigned_to: Vec::new(),
            priority: None,
            due_date: None,
            labels: Vec::new(),
        }
    }

    pub fn normalize(&mut self) {
        trim_in_place(&mut self.title);
        trim_option(&mut self.description);
        self.labels = normalize_labels(std::mem::take(&mut self.labels));
        dedup_in_order(&mut self.assigned_to);
    }
}

/// Input for updating a task. All fields are optional for partial updates.
///
/// Moving a task between lists goes through [`MoveTaskInput`] instead.
///
/// `description` and `dueDate` distinguish "absent" (keep) from `null` (clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_task_description"))]
pub struct UpdateTaskInput {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Task title is required and cannot exceed 200 characters"
    ))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub assigned_to: Option<Vec<Uuid>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub labels: Option<Vec<String>>,
    pub is_archived: Option<bool>,
}

impl UpdateTaskInput {
    pub fn normalize(&mut self) {
        trim_option(&mut self.title);
        trim_nullable(&mut self.description);
        if let Some(labels) = self.labels.take() {
            self.labels = Some(normalize_labels(labels));
        }
        if let Some(assigned) = self.assigned_to.as_mut() {
            dedup_in_order(assigned);
        }
    }
}

/// Input for relocating a task, typically from a drag-and-drop drop index.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskInput {
    pub list_id: Uuid,
    #[validate(range(min = 0, max = MAX_POSITION, message = "Position is out of range"))]
    pub position: i64,
}

fn validate_task_description(input: &UpdateTaskInput) -> Result<(), ValidationError> {
    check_nullable_length(
        &input.description,
        2000,
        "description",
        "Description cannot exceed 2000 characters",
    )
}

fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

fn dedup_in_order(ids: &mut Vec<Uuid>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_through_str() {
        for p in [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent] {
            assert_eq!(Priority::from_str(p.as_str()), Some(p));
        }
        assert_eq!(Priority::from_str("critical"), None);
    }

    #[test]
    fn normalize_trims_and_dedups_labels() {
        let mut input = CreateTaskInput::titled("  Fix bug  ");
        input.labels = vec![" bug ".into(), "bug".into(), "".into(), "ui".into()];

        input.normalize();

        assert_eq!(input.title, "Fix bug");
        assert_eq!(input.labels, vec!["bug".to_string(), "ui".to_string()]);
    }

    #[test]
    fn blank_title_fails_validation_after_normalize() {
        let mut input = CreateTaskInput::titled("   ");
        input.normalize();
        assert!(input.validate().is_err());
    }

    #[test]
    fn move_input_rejects_negative_position() {
        let input = MoveTaskInput {
            list_id: Uuid::new_v4(),
            position: -1,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn move_input_rejects_positions_past_the_cap() {
        let input = MoveTaskInput {
            list_id: Uuid::new_v4(),
            position: i64::MAX,
        };
        assert!(input.validate().is_err());

        let input = MoveTaskInput {
            list_id: Uuid::new_v4(),
            position: MAX_POSITION,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_input_tells_null_from_absent() {
        let cleared: UpdateTaskInput =
            serde_json::from_str(r#"{"dueDate":null,"description":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));
        assert_eq!(cleared.description, Some(None));

        let untouched: UpdateTaskInput = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(untouched.due_date, None);
        assert_eq!(untouched.description, None);
    }

    #[test]
    fn update_input_limits_description_length() {
        let input = UpdateTaskInput {
            description: Some(Some("x".repeat(2001))),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = UpdateTaskInput {
            description: Some(None),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
