/*
 * Responsibility
 * - POST /users: IdP 側で登録済みのユーザーをローカルに provision する (認証なし)
 * - gateway は lookup のみで作成しないため、ここが唯一の作成経路
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::users::{CreateUserRequest, UserResponse},
        extractors::ApiJson,
    },
    error::AppError,
    repos::user_repo,
    state::AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let row = user_repo::create(
        &state.db,
        req.external_id.trim(),
        req.email.trim(),
        req.display_name.as_deref(),
    )
    .await?;

    tracing::info!(user_id = %row.id, "user provisioned");
    Ok((StatusCode::CREATED, Json(row.into())))
}
