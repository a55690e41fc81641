/*
 * Responsibility
 * - /carpools 系 handler
 * - 一覧・取得・更新・削除は AuthCtx の user_id で絞り込み、作成は user_id を刻印する
 * - 他人の carpool は存在しないものとして 404 を返す
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::carpools::{
            AVAILABLE_EXCEEDS_SEATS, CarpoolResponse, CreateCarpoolRequest, ListCarpoolsQuery,
            UpdateCarpoolRequest,
        },
        extractors::{ApiJson, ApiPath, ApiQuery, AuthCtx},
    },
    error::AppError,
    repos::error::RepoError,
    state::AppState,
};

pub async fn list_carpools(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiQuery(query): ApiQuery<ListCarpoolsQuery>,
) -> Result<Json<Vec<CarpoolResponse>>, AppError> {
    let rows = state
        .carpools
        .list_for_owner(auth.user_id(), query.limit(), query.offset())
        .await?;

    Ok(Json(rows.into_iter().map(CarpoolResponse::from).collect()))
}

pub async fn create_carpool(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiJson(req): ApiJson<CreateCarpoolRequest>,
) -> Result<(StatusCode, Json<CarpoolResponse>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let row = state.carpools.create(auth.user_id(), &req.as_new()).await?;

    tracing::info!(carpool_id = %row.id, user_id = %auth.user_id(), "carpool created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_carpool(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiPath(carpool_id): ApiPath<Uuid>,
) -> Result<Json<CarpoolResponse>, AppError> {
    let row = state
        .carpools
        .get_owned(auth.user_id(), carpool_id)
        .await?
        .ok_or(AppError::not_found("carpool"))?;

    Ok(Json(row.into()))
}

pub async fn update_carpool(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiPath(carpool_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCarpoolRequest>,
) -> Result<Json<CarpoolResponse>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let row = state
        .carpools
        .update_owned(auth.user_id(), carpool_id, &req.as_changes())
        .await
        .map_err(|err| match err {
            // Only one field pair can break the stored seat constraint.
            RepoError::ConstraintViolated => AppError::BadRequest(AVAILABLE_EXCEEDS_SEATS),
            other => other.into(),
        })?
        .ok_or(AppError::not_found("carpool"))?;

    Ok(Json(row.into()))
}

pub async fn delete_carpool(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiPath(carpool_id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.carpools.delete_owned(auth.user_id(), carpool_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("carpool"))
    }
}
