use axum::{extract::State, http::StatusCode};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::{broadcast, load_board, record};
use crate::api::middleware::{ApiJson, ApiPath, AuthUser, SessionOrigin};
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::relay::BoardEvent;
use crate::state::AppState;

pub async fn list_lists(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<List>>> {
    let lists = state.db.get_lists_by_board(board_id)?;
    Ok(ApiResponse::ok(lists))
}

pub async fn create_list(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(mut input): ApiJson<CreateListInput>,
) -> AppResult<(StatusCode, ApiResponse<List>)> {
    input.normalize();
    input.validate()?;
    load_board(&state, board_id)?;

    let list = state
        .db
        .create_list(board_id, input, state.positioner.as_ref())?;

    record(
        &state,
        NewActivity::new(
            board_id,
            auth.user_id,
            ActivityAction::CreateList,
            TargetType::List,
            list.id,
        )
        .with_details(json!({ "title": list.title })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::ListCreated {
            board_id,
            list: list.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(list)))
}

pub async fn update_list(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut input): ApiJson<UpdateListInput>,
) -> AppResult<ApiResponse<List>> {
    input.normalize();
    input.validate()?;
    let details = serde_json::to_value(&input).unwrap_or_default();

    let list = state
        .db
        .update_list(id, input)?
        .ok_or_else(|| AppError::not_found("List"))?;

    record(
        &state,
        NewActivity::new(
            list.board_id,
            auth.user_id,
            ActivityAction::UpdateList,
            TargetType::List,
            id,
        )
        .with_details(details),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::ListUpdated {
            board_id: list.board_id,
            list: list.clone(),
        },
    )
    .await;

    Ok(ApiResponse::ok(list))
}

/// Delete a list and its tasks.
pub async fn delete_list(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let list = state
        .db
        .get_list(id)?
        .ok_or_else(|| AppError::not_found("List"))?;

    state.db.delete_list(id)?;

    record(
        &state,
        NewActivity::new(
            list.board_id,
            auth.user_id,
            ActivityAction::DeleteList,
            TargetType::List,
            id,
        )
        .with_details(json!({ "title": list.title })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::ListDeleted {
            board_id: list.board_id,
            list_id: id,
        },
    )
    .await;

    Ok(ApiResponse::empty())
}
