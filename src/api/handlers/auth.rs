use axum::{extract::State, http::StatusCode};
use validator::Validate;

use crate::api::middleware::{ApiJson, AuthUser};
use crate::api::response::ApiResponse;
use crate::auth::{generate_token, hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::*;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<RegisterInput>,
) -> AppResult<(StatusCode, ApiResponse<AuthPayload>)> {
    input.normalize();
    input.validate()?;

    let taken = || AppError::Conflict("User already exists".into());
    if state.db.get_user_credentials(&input.email)?.is_some() {
        return Err(taken());
    }

    let hash = hash_password(&input.password)?;
    let user = state
        .db
        .create_user(&input.name, &input.email, &hash)
        .map_err(|e| {
            if is_unique_violation(&e) {
                taken()
            } else {
                e.into()
            }
        })?;
    let token = generate_token(user.id, &state.config.jwt)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(AuthPayload { token, user }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<ApiResponse<AuthPayload>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let (user, hash) = state
        .db
        .get_user_credentials(input.email.trim())?
        .ok_or_else(invalid)?;

    if !verify_password(&input.password, &hash)? {
        return Err(invalid());
    }

    let token = generate_token(user.id, &state.config.jwt)?;
    Ok(ApiResponse::ok(AuthPayload { token, user }))
}

pub async fn me(auth: AuthUser) -> ApiResponse<User> {
    ApiResponse::ok(auth.user)
}
