/*
 * Responsibility
 * - GET/PUT /profile
 * - 対象ユーザーは常に AuthCtx の user_id (path や body からは受け取らない)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::users::{UpdateProfileRequest, UserResponse},
        extractors::{ApiJson, AuthCtx},
    },
    error::AppError,
    repos::user_repo,
    state::AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthCtx,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, auth.user_id())
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let row = user_repo::update_profile(
        &state.db,
        auth.user_id(),
        req.display_name.as_deref().map(str::trim),
        req.city.as_deref(),
        req.state.as_deref(),
    )
    .await?
    .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}
