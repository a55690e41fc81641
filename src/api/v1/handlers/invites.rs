/*
 * Responsibility
 * - /invites 系 handler
 * - 作成: 自分が作成した carpool にのみ招待でき、from_user は AuthCtx の user_id を刻印する
 * - 取得: 送信者・受信者以外には 404
 * - 応答: 受信者のみ (送信者は 403)、pending 以外は 409
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::invites::{CreateInviteRequest, InviteResponse, RespondInviteRequest},
        extractors::{ApiJson, ApiPath, AuthCtx},
    },
    error::AppError,
    repos::error::RepoError,
    state::AppState,
};

pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiJson(req): ApiJson<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), AppError> {
    req.validate(auth.user_id()).map_err(AppError::BadRequest)?;

    state
        .carpools
        .get_owned(auth.user_id(), req.carpool_id)
        .await?
        .ok_or(AppError::not_found("carpool"))?;

    let row = state
        .invites
        .create(auth.user_id(), &req.as_new())
        .await
        .map_err(|err| match err {
            RepoError::MissingReference => AppError::not_found("user"),
            other => other.into(),
        })?;

    tracing::info!(invite_id = %row.id, from_user = %row.from_user, "invite created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_invite(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiPath(invite_id): ApiPath<Uuid>,
) -> Result<Json<InviteResponse>, AppError> {
    let row = state
        .invites
        .get_visible(auth.user_id(), invite_id)
        .await?
        .ok_or(AppError::not_found("invite"))?;

    Ok(Json(row.into()))
}

pub async fn respond_invite(
    State(state): State<AppState>,
    auth: AuthCtx,
    ApiPath(invite_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RespondInviteRequest>,
) -> Result<Json<InviteResponse>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    if let Some(row) = state
        .invites
        .respond(auth.user_id(), invite_id, req.status)
        .await?
    {
        return Ok(Json(row.into()));
    }

    // Nothing was updated: work out why.
    match state.invites.get_visible(auth.user_id(), invite_id).await? {
        None => Err(AppError::not_found("invite")),
        Some(row) if row.to_user != auth.user_id() => {
            Err(AppError::Forbidden("only the invitee can respond"))
        }
        Some(_) => Err(AppError::Conflict("invite already answered")),
    }
}
