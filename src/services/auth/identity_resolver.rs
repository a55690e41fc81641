use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::{error::AuthError, token_verifier::VerifiedClaims};

/// Local representation of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Read-only lookup of provisioned users by the identity provider's subject id.
///
/// Implementations must be idempotent and side-effect free.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str)
    -> Result<Option<UserIdentity>, RepoError>;
}

/// Maps verified claims to a local user with exactly one directory lookup.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
    timeout: Duration,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    pub async fn resolve(&self, claims: &VerifiedClaims) -> Result<UserIdentity, AuthError> {
        let lookup = self.directory.find_by_external_id(&claims.subject);

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Some(user))) => Ok(user),
            Ok(Ok(None)) => {
                tracing::warn!(subject = %claims.subject, "verified subject is not provisioned");
                Err(AuthError::UnknownPrincipal)
            }
            Ok(Err(err)) => {
                tracing::error!(error = ?err, subject = %claims.subject, "user lookup failed");
                Err(AuthError::InternalFault)
            }
            Err(_) => {
                tracing::warn!(
                    subject = %claims.subject,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "user lookup timed out"
                );
                Err(AuthError::ResolutionTimeout)
            }
        }
    }
}
