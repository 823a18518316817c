use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::middleware::AuthUser;
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::state::AppState;

const ALL_USERS_LIMIT: u32 = 50;
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub query: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<ApiResponse<Vec<User>>> {
    let users = state.db.get_all_users(ALL_USERS_LIMIT)?;
    Ok(ApiResponse::ok(users))
}

/// Case-insensitive substring match on name or email.
pub async fn search_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<UserSearchQuery>,
) -> AppResult<ApiResponse<Vec<User>>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".into()))?;

    let users = state.db.search_users(query, SEARCH_LIMIT)?;
    Ok(ApiResponse::ok(users))
}
