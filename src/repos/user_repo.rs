/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - external_id (IdP の subject) → ローカルユーザーの lookup を UserDirectory として提供
 * - DB エラーは RepoError に変換して返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::{UserDirectory, UserIdentity};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserIdentity {
    fn from(row: UserRow) -> Self {
        UserIdentity {
            id: row.id,
            external_id: row.external_id,
            email: row.email,
            display_name: row.display_name,
        }
    }
}

const USER_COLUMNS: &str =
    "id, external_id, email, display_name, city, state, created_at, updated_at";

pub async fn create(
    db: &PgPool,
    external_id: &str,
    email: &str,
    display_name: Option<&str>,
) -> Result<UserRow, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO users (external_id, email, display_name)
        VALUES ($1, $2, $3)
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, UserRow>(&sql)
        .bind(external_id)
        .bind(email)
        .bind(display_name)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn find_by_external_id(
    db: &PgPool,
    external_id: &str,
) -> Result<Option<UserRow>, RepoError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = $1");

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(external_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    display_name: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> Result<Option<UserRow>, RepoError> {
    // None means "keep the current value"
    let sql = format!(
        r#"
        UPDATE users
        SET
            display_name = COALESCE($2, display_name),
            city = COALESCE($3, city),
            state = COALESCE($4, state),
            updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .bind(display_name)
        .bind(city)
        .bind(state)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// `UserDirectory` backed by the shared Postgres pool.
#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserIdentity>, RepoError> {
        Ok(find_by_external_id(&self.db, external_id)
            .await?
            .map(UserIdentity::from))
    }
}
