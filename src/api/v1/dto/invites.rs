/*
 * Responsibility
 * - Invites の request/response DTO
 * - from_user は body から受け取らない (認証済みユーザーから刻印する)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::invite_repo::{InviteRow, InviteStatus, NewInvite};

const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub to_user: Uuid,
    pub carpool_id: Uuid,
    #[serde(default)]
    pub message: String,
}

impl CreateInviteRequest {
    pub fn validate(&self, from_user: Uuid) -> Result<(), &'static str> {
        if self.to_user == from_user {
            return Err("cannot invite yourself");
        }
        if self.message.len() > MAX_MESSAGE_LEN {
            return Err("message must be <= 500 chars");
        }

        Ok(())
    }

    pub fn as_new(&self) -> NewInvite<'_> {
        NewInvite {
            to_user: self.to_user,
            carpool_id: self.carpool_id,
            message: self.message.trim(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RespondInviteRequest {
    pub status: InviteStatus,
}

impl RespondInviteRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        match self.status {
            InviteStatus::Accepted | InviteStatus::Rejected => Ok(()),
            InviteStatus::Pending => Err("status must be accepted or rejected"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub carpool_id: Uuid,
    pub message: String,
    pub status: Option<InviteStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InviteRow> for InviteResponse {
    fn from(row: InviteRow) -> Self {
        Self {
            id: row.id,
            from_user: row.from_user,
            to_user: row.to_user,
            carpool_id: row.carpool_id,
            message: row.message,
            status: InviteStatus::from_code(row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_invites_are_rejected() {
        let me = Uuid::new_v4();
        let req = CreateInviteRequest {
            to_user: me,
            carpool_id: Uuid::new_v4(),
            message: String::new(),
        };
        assert_eq!(req.validate(me), Err("cannot invite yourself"));
        assert!(req.validate(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn long_messages_are_rejected() {
        let req = CreateInviteRequest {
            to_user: Uuid::new_v4(),
            carpool_id: Uuid::new_v4(),
            message: "x".repeat(501),
        };
        assert!(req.validate(Uuid::new_v4()).is_err());
    }

    #[test]
    fn responding_with_pending_is_rejected() {
        let req: RespondInviteRequest = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: RespondInviteRequest = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
