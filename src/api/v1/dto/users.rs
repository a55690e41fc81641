/*
 * Responsibility
 * - Users / Profile の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRow;

const MAX_TEXT_LEN: usize = 256;

fn too_long(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| v.len() > MAX_TEXT_LEN)
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.external_id.trim().is_empty() {
            return Err("external_id is required");
        }
        if self.external_id.len() > MAX_TEXT_LEN {
            return Err("external_id must be <= 256 chars");
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("email is invalid");
        }
        if self.email.len() > MAX_TEXT_LEN {
            return Err("email must be <= 256 chars");
        }
        if too_long(&self.display_name) {
            return Err("display_name must be <= 256 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.display_name
            && name.trim().is_empty()
        {
            return Err("display_name cannot be empty");
        }
        if too_long(&self.display_name) || too_long(&self.city) || too_long(&self.state) {
            return Err("profile fields must be <= 256 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            email: row.email,
            display_name: row.display_name,
            city: row.city,
            state: row.state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
