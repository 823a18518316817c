use axum::extract::{Query, State};
use uuid::Uuid;

use crate::api::middleware::{ApiPath, AuthUser};
use crate::api::response::{ApiResponse, PageQuery, Pagination};
use crate::error::AppResult;
use crate::models::Activity;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;

/// Board activity feed, newest first.
pub async fn list_activities(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Activity>>> {
    let (page, limit) = query.resolve(DEFAULT_LIMIT);
    let activities = state.db.get_activities_by_board(board_id, page, limit)?;

    Ok(ApiResponse::paginated(
        activities.items,
        Pagination::new(page, limit, activities.total),
    ))
}
