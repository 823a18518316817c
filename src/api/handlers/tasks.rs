use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::{broadcast, record};
use crate::api::middleware::{ApiJson, ApiPath, AuthUser, SessionOrigin};
use crate::api::response::{ApiResponse, PageQuery, Pagination};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::relay::BoardEvent;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;

pub async fn list_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(list_id): ApiPath<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    let (page, limit) = query.resolve(DEFAULT_LIMIT);
    let tasks = state
        .db
        .get_tasks_by_list(list_id, query.search(), page, limit)?;

    Ok(ApiResponse::paginated(
        tasks.items,
        Pagination::new(page, limit, tasks.total),
    ))
}

pub async fn list_board_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    let tasks = state.db.get_tasks_by_board(board_id)?;
    Ok(ApiResponse::ok(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(list_id): ApiPath<Uuid>,
    ApiJson(mut input): ApiJson<CreateTaskInput>,
) -> AppResult<(StatusCode, ApiResponse<Task>)> {
    input.normalize();
    input.validate()?;

    let list = state
        .db
        .get_list(list_id)?
        .ok_or_else(|| AppError::not_found("List"))?;

    let task = state
        .db
        .create_task(&list, auth.user_id, input, state.positioner.as_ref())?;

    record(
        &state,
        NewActivity::new(
            task.board_id,
            auth.user_id,
            ActivityAction::CreateTask,
            TargetType::Task,
            task.id,
        )
        .with_details(json!({ "title": task.title, "listId": list_id })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::TaskCreated {
            board_id: task.board_id,
            task: task.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(task)))
}

/// Partial update. Changes to the assignee set are also recorded as
/// individual assign/unassign activities.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut input): ApiJson<UpdateTaskInput>,
) -> AppResult<ApiResponse<Task>> {
    input.normalize();
    input.validate()?;
    let details = serde_json::to_value(&input).unwrap_or_default();

    let before = state
        .db
        .get_task(id)?
        .ok_or_else(|| AppError::not_found("Task"))?;
    let task = state
        .db
        .update_task(id, input)?
        .ok_or_else(|| AppError::not_found("Task"))?;

    let activity =
        |action| NewActivity::new(task.board_id, auth.user_id, action, TargetType::Task, id);
    record(&state, activity(ActivityAction::UpdateTask).with_details(details));
    for user_id in task.assigned_to.iter().filter(|u| !before.assigned_to.contains(u)) {
        record(
            &state,
            activity(ActivityAction::AssignUser).with_details(json!({ "userId": user_id })),
        );
    }
    for user_id in before.assigned_to.iter().filter(|u| !task.assigned_to.contains(u)) {
        record(
            &state,
            activity(ActivityAction::UnassignUser).with_details(json!({ "userId": user_id })),
        );
    }

    broadcast(
        &state,
        origin,
        BoardEvent::TaskUpdated {
            board_id: task.board_id,
            task: task.clone(),
        },
    )
    .await;

    Ok(ApiResponse::ok(task))
}

/// Move a task to another list, or to another position in the same list.
pub async fn move_task(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<MoveTaskInput>,
) -> AppResult<ApiResponse<Task>> {
    input.validate()?;

    if state.db.get_task(id)?.is_none() {
        return Err(AppError::not_found("Task"));
    }
    if state.db.get_list(input.list_id)?.is_none() {
        return Err(AppError::not_found("List"));
    }

    let moved = state
        .db
        .move_task(id, input.list_id, input.position, state.positioner.as_ref())?
        .ok_or_else(|| AppError::not_found("Task"))?;
    let task = moved.task;

    record(
        &state,
        NewActivity::new(
            task.board_id,
            auth.user_id,
            ActivityAction::MoveTask,
            TargetType::Task,
            id,
        )
        .with_details(json!({
            "from": moved.from_list_id,
            "to": task.list_id,
            "position": task.position,
        })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::TaskMoved {
            board_id: task.board_id,
            task_id: id,
            from: moved.from_list_id,
            to: task.list_id,
            position: task.position,
            task: task.clone(),
        },
    )
    .await;

    Ok(ApiResponse::ok(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let task = state
        .db
        .get_task(id)?
        .ok_or_else(|| AppError::not_found("Task"))?;

    state.db.delete_task(id)?;

    record(
        &state,
        NewActivity::new(
            task.board_id,
            auth.user_id,
            ActivityAction::DeleteTask,
            TargetType::Task,
            id,
        )
        .with_details(json!({ "title": task.title })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::TaskDeleted {
            board_id: task.board_id,
            task_id: id,
            list_id: task.list_id,
        },
    )
    .await;

    Ok(ApiResponse::empty())
}
