/*
 * Responsibility
 * - invites の作成・取得・応答
 * - from_user は常に認証済みユーザーの id を刻印する (body からは受け取らない)
 * - 取得できるのは送信者か受信者のみ、応答できるのは受信者のみ
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Rejected => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Accepted),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InviteRow {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub carpool_id: Uuid,
    pub message: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvite<'a> {
    pub to_user: Uuid,
    pub carpool_id: Uuid,
    pub message: &'a str,
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    async fn create(&self, from_user: Uuid, new: &NewInvite<'_>) -> Result<InviteRow, RepoError>;

    /// Visible to the sender and the recipient only.
    async fn get_visible(&self, user_id: Uuid, invite_id: Uuid)
    -> Result<Option<InviteRow>, RepoError>;

    /// Answer a pending invite addressed to `to_user`. `None` when no such
    /// pending invite exists.
    async fn respond(
        &self,
        to_user: Uuid,
        invite_id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<InviteRow>, RepoError>;
}

const INVITE_COLUMNS: &str =
    "id, from_user, to_user, carpool_id, message, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgInviteStore {
    db: PgPool,
}

impl PgInviteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InviteStore for PgInviteStore {
    async fn create(&self, from_user: Uuid, new: &NewInvite<'_>) -> Result<InviteRow, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO invites (from_user, to_user, carpool_id, message, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INVITE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, InviteRow>(&sql)
            .bind(from_user)
            .bind(new.to_user)
            .bind(new.carpool_id)
            .bind(new.message)
            .bind(InviteStatus::Pending.code())
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn get_visible(
        &self,
        user_id: Uuid,
        invite_id: Uuid,
    ) -> Result<Option<InviteRow>, RepoError> {
        let sql = format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM invites
            WHERE id = $1 AND (from_user = $2 OR to_user = $2)
            "#
        );

        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(invite_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn respond(
        &self,
        to_user: Uuid,
        invite_id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<InviteRow>, RepoError> {
        let sql = format!(
            r#"
            UPDATE invites
            SET status = $3, updated_at = now()
            WHERE id = $1 AND to_user = $2 AND status = $4
            RETURNING {INVITE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(invite_id)
            .bind(to_user)
            .bind(status.code())
            .bind(InviteStatus::Pending.code())
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }
}
