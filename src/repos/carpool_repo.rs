/*
 * Responsibility
 * - carpools CRUD
 * - 全ての操作は creator_id (認証済みユーザーの id) で絞り込む / 刻印する
 * - CarpoolStore trait を境界にして handler から DB を隠す (テストでは in-memory 実装に差し替え)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CarpoolRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub carpool_name: String,
    pub status: bool,
    pub recurring_option: Option<String>,
    pub seats: i32,
    pub available_seats: i32,
    pub destination_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCarpool<'a> {
    pub carpool_name: &'a str,
    pub recurring_option: Option<&'a str>,
    pub seats: i32,
    pub destination_address: &'a str,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CarpoolChanges<'a> {
    pub carpool_name: Option<&'a str>,
    pub status: Option<bool>,
    pub recurring_option: Option<&'a str>,
    pub seats: Option<i32>,
    pub available_seats: Option<i32>,
    pub destination_address: Option<&'a str>,
}

/// Carpool persistence. Every method is scoped to `owner_id`: rows created by
/// anyone else behave as if they did not exist.
#[async_trait]
pub trait CarpoolStore: Send + Sync {
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CarpoolRow>, RepoError>;

    async fn create(&self, owner_id: Uuid, new: &NewCarpool<'_>) -> Result<CarpoolRow, RepoError>;

    async fn get_owned(&self, owner_id: Uuid, carpool_id: Uuid)
    -> Result<Option<CarpoolRow>, RepoError>;

    async fn update_owned(
        &self,
        owner_id: Uuid,
        carpool_id: Uuid,
        changes: &CarpoolChanges<'_>,
    ) -> Result<Option<CarpoolRow>, RepoError>;

    async fn delete_owned(&self, owner_id: Uuid, carpool_id: Uuid) -> Result<bool, RepoError>;
}

const CARPOOL_COLUMNS: &str = "id, creator_id, carpool_name, status, recurring_option, \
     seats, available_seats, destination_address, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgCarpoolStore {
    db: PgPool,
}

impl PgCarpoolStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarpoolStore for PgCarpoolStore {
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CarpoolRow>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CARPOOL_COLUMNS}
            FROM carpools
            WHERE creator_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, CarpoolRow>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(rows)
    }

    async fn create(&self, owner_id: Uuid, new: &NewCarpool<'_>) -> Result<CarpoolRow, RepoError> {
        // A new carpool starts with every seat available.
        let sql = format!(
            r#"
            INSERT INTO carpools (
                creator_id, carpool_name, recurring_option,
                seats, available_seats, destination_address
            )
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {CARPOOL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CarpoolRow>(&sql)
            .bind(owner_id)
            .bind(new.carpool_name)
            .bind(new.recurring_option)
            .bind(new.seats)
            .bind(new.destination_address)
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_owned(
        &self,
        owner_id: Uuid,
        carpool_id: Uuid,
    ) -> Result<Option<CarpoolRow>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CARPOOL_COLUMNS}
            FROM carpools
            WHERE id = $1 AND creator_id = $2
            "#
        );

        let row = sqlx::query_as::<_, CarpoolRow>(&sql)
            .bind(carpool_id)
            .bind(owner_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        carpool_id: Uuid,
        changes: &CarpoolChanges<'_>,
    ) -> Result<Option<CarpoolRow>, RepoError> {
        let sql = format!(
            r#"
            UPDATE carpools
            SET
                carpool_name        = COALESCE($3, carpool_name),
                status              = COALESCE($4, status),
                recurring_option    = COALESCE($5, recurring_option),
                seats               = COALESCE($6, seats),
                available_seats     = COALESCE($7, available_seats),
                destination_address = COALESCE($8, destination_address),
                updated_at          = now()
            WHERE id = $1 AND creator_id = $2
            RETURNING {CARPOOL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CarpoolRow>(&sql)
            .bind(carpool_id)
            .bind(owner_id)
            .bind(changes.carpool_name)
            .bind(changes.status)
            .bind(changes.recurring_option)
            .bind(changes.seats)
            .bind(changes.available_seats)
            .bind(changes.destination_address)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete_owned(&self, owner_id: Uuid, carpool_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM carpools
            WHERE id = $1 AND creator_id = $2
            "#,
        )
        .bind(carpool_id)
        .bind(owner_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
