/*
 * Responsibility
 * - Carpools の request/response DTO
 * - creator_id は body から受け取らない (認証済みユーザーから刻印する)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::carpool_repo::{CarpoolChanges, CarpoolRow, NewCarpool};

const MAX_SEATS: i32 = 16;

pub const AVAILABLE_EXCEEDS_SEATS: &str = "available_seats cannot exceed seats";

#[derive(Debug, Deserialize)]
pub struct CreateCarpoolRequest {
    pub carpool_name: String,
    pub destination_address: String,
    pub seats: i32,
    pub recurring_option: Option<String>,
}

impl CreateCarpoolRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.carpool_name.trim().is_empty() {
            return Err("carpool_name is required");
        }
        if self.destination_address.trim().is_empty() {
            return Err("destination_address is required");
        }
        if !(1..=MAX_SEATS).contains(&self.seats) {
            return Err("seats must be between 1 and 16");
        }
        if let Some(opt) = &self.recurring_option
            && opt.trim().is_empty()
        {
            return Err("recurring_option cannot be empty");
        }

        Ok(())
    }

    pub fn as_new(&self) -> NewCarpool<'_> {
        NewCarpool {
            carpool_name: self.carpool_name.trim(),
            recurring_option: self.recurring_option.as_deref().map(str::trim),
            seats: self.seats,
            destination_address: self.destination_address.trim(),
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCarpoolRequest {
    pub carpool_name: Option<String>,
    pub status: Option<bool>,
    pub recurring_option: Option<String>,
    pub seats: Option<i32>,
    pub available_seats: Option<i32>,
    pub destination_address: Option<String>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| v.trim().is_empty())
}

impl UpdateCarpoolRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if blank(&self.carpool_name) {
            return Err("carpool_name cannot be empty");
        }
        if blank(&self.destination_address) {
            return Err("destination_address cannot be empty");
        }
        if blank(&self.recurring_option) {
            return Err("recurring_option cannot be empty");
        }
        if let Some(seats) = self.seats
            && !(1..=MAX_SEATS).contains(&seats)
        {
            return Err("seats must be between 1 and 16");
        }
        if let Some(available) = self.available_seats {
            if available < 0 {
                return Err("available_seats cannot be negative");
            }
            if let Some(seats) = self.seats
                && available > seats
            {
                return Err(AVAILABLE_EXCEEDS_SEATS);
            }
        }
        if self.is_empty() {
            return Err("no fields to update");
        }

        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.carpool_name.is_none()
            && self.status.is_none()
            && self.recurring_option.is_none()
            && self.seats.is_none()
            && self.available_seats.is_none()
            && self.destination_address.is_none()
    }

    pub fn as_changes(&self) -> CarpoolChanges<'_> {
        CarpoolChanges {
            carpool_name: self.carpool_name.as_deref().map(str::trim),
            status: self.status,
            recurring_option: self.recurring_option.as_deref().map(str::trim),
            seats: self.seats,
            available_seats: self.available_seats,
            destination_address: self.destination_address.as_deref().map(str::trim),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListCarpoolsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListCarpoolsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize)]
pub struct CarpoolResponse {
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

impl From<CarpoolRow> for CarpoolResponse {
    fn from(row: CarpoolRow) -> Self {
        Self {
            id: row.id,
            creator_id: row.creator_id,
            carpool_name: row.carpool_name,
            status: row.status,
            recurring_option: row.recurring_option,
            seats: row.seats,
            available_seats: row.available_seats,
            destination_address: row.destination_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
