mod activities;
mod auth;
mod boards;
mod lists;
mod tasks;
mod users;

pub use activities::*;
pub use auth::*;
pub use boards::*;
pub use lists::*;
pub use tasks::*;
pub use users::*;

use axum::{response::IntoResponse, Json};
use uuid::Uuid;

use crate::api::middleware::SessionOrigin;
use crate::error::{AppError, AppResult};
use crate::models::{Board, NewActivity};
use crate::relay::BoardEvent;
use crate::state::AppState;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Shared helpers
// ============================================================

/// Write an activity record. Failures are logged and swallowed.
fn record(state: &AppState, activity: NewActivity) {
    let action = activity.action.as_str();
    let board_id = activity.board_id;
    if let Err(e) = state.db.record_activity(activity) {
        tracing::warn!(board_id = %board_id, action, error = ?e, "Failed to record activity");
    }
}

/// Fan an event out to the board's room, skipping the session that made the
/// request.
async fn broadcast(state: &AppState, origin: SessionOrigin, event: BoardEvent) {
    state.rooms.broadcast(&event, origin.0).await;
}

fn load_board(state: &AppState, id: Uuid) -> AppResult<Board> {
    state
        .db
        .get_board(id)?
        .ok_or_else(|| AppError::not_found("Board"))
}
