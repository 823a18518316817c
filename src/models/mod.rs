//! Domain models for the task board.
//!
//! # Core Concepts
//!
//! - [`Board`]: Top-level container owned by one [`User`] and shared with members.
//! - [`List`]: Ordered column within a board. Lists are ordered by `position`.
//! - [`Task`]: Unit of work within a list, ordered by `position` inside its list.
//! - [`Activity`]: Audit record of a mutation. Written best-effort and never
//!   allowed to fail the mutation it describes.
//!
//! Request bodies are modelled as `*Input` types. They are deserialized from
//! camelCase JSON, normalized (string fields trimmed), then validated with
//! [`validator`] before they reach the store.

mod activity;
mod board;
mod list;
mod task;
mod user;

pub use activity::*;
pub use board::*;
pub use list::*;
pub use task::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Largest position a client may request.
pub const MAX_POSITION: i64 = i32::MAX as i64;

/// Deserialize a nullable field of a partial update: absent stays `None`,
/// explicit `null` becomes `Some(None)`. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim a required string in place.
pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional string in place.
pub(crate) fn trim_option(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim_in_place(v);
    }
}

pub(crate) fn trim_nullable(value: &mut Option<Option<String>>) {
    if let Some(v) = value.as_mut() {
        trim_option(v);
    }
}

/// Character-length check for a nullable update field. `null` always passes.
pub(crate) fn check_nullable_length(
    value: &Option<Option<String>>,
    max: usize,
    code: &'static str,
    message: &'static str,
) -> Result<(), validator::ValidationError> {
    match value {
        Some(Some(s)) if s.chars().count() > max => {
            Err(validator::ValidationError::new(code).with_message(message.into()))
        }
        _ => Ok(()),
    }
}
