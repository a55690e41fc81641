#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use carpool_api::config::{AuthSettings, KeyFamily};
use carpool_api::repos::carpool_repo::{CarpoolChanges, CarpoolRow, CarpoolStore, NewCarpool};
use carpool_api::repos::error::RepoError;
use carpool_api::repos::invite_repo::{InviteRow, InviteStatus, InviteStore, NewInvite};
use carpool_api::services::auth::{AuthGateway, UserDirectory, UserIdentity, build_auth_gateway};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

pub const TRUSTED_PRIVATE: &str = include_str!("../fixtures/trusted_rsa_private.pem");
pub const TRUSTED_PUBLIC: &str = include_str!("../fixtures/trusted_rsa_public.pem");
pub const UNTRUSTED_PRIVATE: &str = include_str!("../fixtures/untrusted_rsa_private.pem");

/// In-memory directory that counts lookups.
#[derive(Default)]
pub struct MemoryDirectory {
    users: HashMap<String, UserIdentity>,
    calls: AtomicUsize,
}

impl MemoryDirectory {
    pub fn with(users: Vec<UserIdentity>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.external_id.clone(), u))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserIdentity>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.get(external_id).cloned())
    }
}

pub fn settings() -> AuthSettings {
    AuthSettings {
        public_key_pem: TRUSTED_PUBLIC.to_string(),
        key_family: KeyFamily::Rsa,
        allowed_algorithms: vec![Algorithm::RS256],
        issuer: None,
        audience: None,
        leeway_seconds: 0,
        resolution_timeout: Duration::from_millis(500),
    }
}

pub fn gateway(directory: Arc<MemoryDirectory>) -> Arc<AuthGateway> {
    build_auth_gateway(&settings(), directory).unwrap()
}

pub fn user(external_id: &str) -> UserIdentity {
    UserIdentity {
        id: Uuid::new_v4(),
        external_id: external_id.to_string(),
        email: format!("{external_id}@example.com"),
        display_name: Some("Test User".to_string()),
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn token_with(private_pem: &str, alg: Algorithm, claims: serde_json::Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(alg), &claims, &key).unwrap()
}

pub fn valid_token(subject: &str) -> String {
    token_with(
        TRUSTED_PRIVATE,
        Algorithm::RS256,
        json!({"sub": subject, "exp": now() + 600, "iat": now()}),
    )
}

/// In-memory `CarpoolStore` with the same owner scoping as the SQL queries.
/// Records the owner id passed to every call.
#[derive(Default)]
pub struct MemoryCarpools {
    rows: Mutex<Vec<CarpoolRow>>,
    owners_seen: Mutex<Vec<Uuid>>,
}

impl MemoryCarpools {
    pub fn rows(&self) -> Vec<CarpoolRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn owners_seen(&self) -> Vec<Uuid> {
        self.owners_seen.lock().unwrap().clone()
    }

    fn saw(&self, owner_id: Uuid) {
        self.owners_seen.lock().unwrap().push(owner_id);
    }
}

#[async_trait]
impl CarpoolStore for MemoryCarpools {
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CarpoolRow>, RepoError> {
        self.saw(owner_id);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.creator_id == owner_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, owner_id: Uuid, new: &NewCarpool<'_>) -> Result<CarpoolRow, RepoError> {
        self.saw(owner_id);
        let now = Utc::now();
        let row = CarpoolRow {
            id: Uuid::new_v4(),
            creator_id: owner_id,
            carpool_name: new.carpool_name.to_string(),
            status: true,
            recurring_option: new.recurring_option.map(str::to_string),
            seats: new.seats,
            available_seats: new.seats,
            destination_address: new.destination_address.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get_owned(
        &self,
        owner_id: Uuid,
        carpool_id: Uuid,
    ) -> Result<Option<CarpoolRow>, RepoError> {
        self.saw(owner_id);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == carpool_id && r.creator_id == owner_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        carpool_id: Uuid,
        changes: &CarpoolChanges<'_>,
    ) -> Result<Option<CarpoolRow>, RepoError> {
        self.saw(owner_id);
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|r| r.id == carpool_id && r.creator_id == owner_id)
        else {
            return Ok(None);
        };

        let mut next = row.clone();
        if let Some(v) = changes.carpool_name {
            next.carpool_name = v.to_string();
        }
        if let Some(v) = changes.status {
            next.status = v;
        }
        if let Some(v) = changes.recurring_option {
            next.recurring_option = Some(v.to_string());
        }
        if let Some(v) = changes.seats {
            next.seats = v;
        }
        if let Some(v) = changes.available_seats {
            next.available_seats = v;
        }
        if let Some(v) = changes.destination_address {
            next.destination_address = v.to_string();
        }
        if next.available_seats > next.seats {
            return Err(RepoError::ConstraintViolated);
        }
        next.updated_at = Utc::now();

        *row = next.clone();
        Ok(Some(next))
    }

    async fn delete_owned(&self, owner_id: Uuid, carpool_id: Uuid) -> Result<bool, RepoError> {
        self.saw(owner_id);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == carpool_id && r.creator_id == owner_id));
        Ok(rows.len() < before)
    }
}

/// In-memory `InviteStore`. `to_user` must be one of `known_users`, like the
/// foreign key on the real table.
pub struct MemoryInvites {
    known_users: Vec<Uuid>,
    rows: Mutex<Vec<InviteRow>>,
}

impl MemoryInvites {
    pub fn new(known_users: Vec<Uuid>) -> Self {
        Self {
            known_users,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn rows(&self) -> Vec<InviteRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl InviteStore for MemoryInvites {
    async fn create(&self, from_user: Uuid, new: &NewInvite<'_>) -> Result<InviteRow, RepoError> {
        if !self.known_users.contains(&new.to_user) {
            return Err(RepoError::MissingReference);
        }
        let now = Utc::now();
        let row = InviteRow {
            id: Uuid::new_v4(),
            from_user,
            to_user: new.to_user,
            carpool_id: new.carpool_id,
            message: new.message.to_string(),
            status: InviteStatus::Pending.code(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get_visible(
        &self,
        user_id: Uuid,
        invite_id: Uuid,
    ) -> Result<Option<InviteRow>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == invite_id && (r.from_user == user_id || r.to_user == user_id))
            .cloned())
    }

    async fn respond(
        &self,
        to_user: Uuid,
        invite_id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<InviteRow>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| {
            r.id == invite_id && r.to_user == to_user && r.status == InviteStatus::Pending.code()
        }) else {
            return Ok(None);
        };
        row.status = status.code();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}
