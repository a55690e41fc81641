/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - 起動時に 1 度だけ組み立て、全リクエストで read-only 共有する
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::{
    carpool_repo::{CarpoolStore, PgCarpoolStore},
    invite_repo::{InviteStore, PgInviteStore},
};
use crate::services::auth::AuthGateway;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<AuthGateway>,
    pub carpools: Arc<dyn CarpoolStore>,
    pub invites: Arc<dyn InviteStore>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, auth: Arc<AuthGateway>) -> Self {
        Self {
            carpools: Arc::new(PgCarpoolStore::new(db.clone())),
            invites: Arc::new(PgInviteStore::new(db.clone())),
            db,
            auth,
        }
    }

    /// Replace the ownership-scoped stores (in-memory stores in tests).
    pub fn with_stores(
        mut self,
        carpools: Arc<dyn CarpoolStore>,
        invites: Arc<dyn InviteStore>,
    ) -> Self {
        self.carpools = carpools;
        self.invites = invites;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
