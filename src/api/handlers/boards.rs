use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::{broadcast, load_board, record};
use crate::api::middleware::{ApiJson, ApiPath, AuthUser, SessionOrigin};
use crate::api::response::{ApiResponse, PageQuery, Pagination};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::relay::BoardEvent;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 10;

pub async fn list_boards(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Board>>> {
    let (page, limit) = query.resolve(DEFAULT_LIMIT);
    let boards = state
        .db
        .get_boards_for_user(auth.user_id, query.search(), page, limit)?;

    Ok(ApiResponse::paginated(
        boards.items,
        Pagination::new(page, limit, boards.total),
    ))
}

pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(mut input): ApiJson<CreateBoardInput>,
) -> AppResult<(StatusCode, ApiResponse<Board>)> {
    input.normalize();
    input.validate()?;

    let board = state.db.create_board(auth.user_id, input)?;
    record(
        &state,
        NewActivity::new(
            board.id,
            auth.user_id,
            ActivityAction::CreateBoard,
            TargetType::Board,
            board.id,
        )
        .with_details(json!({ "title": board.title })),
    );

    Ok((StatusCode::CREATED, ApiResponse::ok(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Board>> {
    let board = load_board(&state, id)?;
    if !board.has_access(auth.user_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    Ok(ApiResponse::ok(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut input): ApiJson<UpdateBoardInput>,
) -> AppResult<ApiResponse<Board>> {
    let board = load_board(&state, id)?;
    if !board.is_owner(auth.user_id) {
        return Err(AppError::Forbidden("Only board owner can update board".into()));
    }

    input.normalize();
    input.validate()?;
    let details = serde_json::to_value(&input).unwrap_or_default();

    let board = state
        .db
        .update_board(id, input)?
        .ok_or_else(|| AppError::not_found("Board"))?;

    record(
        &state,
        NewActivity::new(id, auth.user_id, ActivityAction::UpdateBoard, TargetType::Board, id)
            .with_details(details),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::BoardUpdated {
            board_id: id,
            board: board.clone(),
        },
    )
    .await;

    Ok(ApiResponse::ok(board))
}

/// Delete a board with every list, task, and activity in it.
pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let board = load_board(&state, id)?;
    if !board.is_owner(auth.user_id) {
        return Err(AppError::Forbidden("Only board owner can delete board".into()));
    }

    state.db.delete_board(id)?;
    tracing::info!(board_id = %id, user_id = %auth.user_id, "Board deleted");

    Ok(ApiResponse::empty())
}

/// Add a member. Adding an existing member changes nothing.
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: SessionOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<AddMemberInput>,
) -> AppResult<ApiResponse<Board>> {
    let board = load_board(&state, id)?;
    if !board.is_owner(auth.user_id) {
        return Err(AppError::Forbidden("Only board owner can add members".into()));
    }

    if state.db.get_user(input.user_id)?.is_none() {
        return Err(AppError::not_found("User"));
    }

    if !state.db.add_board_member(id, input.user_id)? {
        return Ok(ApiResponse::ok(board));
    }

    let board = load_board(&state, id)?;
    record(
        &state,
        NewActivity::new(id, auth.user_id, ActivityAction::AddMember, TargetType::Board, id)
            .with_details(json!({ "userId": input.user_id })),
    );
    broadcast(
        &state,
        origin,
        BoardEvent::MemberAssigned {
            board_id: id,
            user_id: input.user_id,
            board: board.clone(),
        },
    )
    .await;

    Ok(ApiResponse::ok(board))
}
