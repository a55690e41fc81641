//! Authentication pipeline: credential → verified claims → local identity.
//!
//! Transport-agnostic. The axum middleware in `middleware::auth::access`
//! drives this and binds the result into the request context.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::services::auth::{
    credential::extract_bearer,
    error::{AuthError, AuthStage},
    identity_resolver::{IdentityResolver, UserIdentity},
    token_verifier::TokenVerifier,
};

/// Process-wide gateway. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct AuthGateway {
    verifier: Arc<dyn TokenVerifier>,
    resolver: IdentityResolver,
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl AuthGateway {
    pub fn new(verifier: Arc<dyn TokenVerifier>, resolver: IdentityResolver) -> Self {
        Self { verifier, resolver }
    }

    /// Run the whole pipeline for one request's `Authorization` header.
    ///
    /// No step is retried. The first failure ends the pipeline.
    pub async fn authenticate(
        &self,
        authorization: Option<&HeaderValue>,
    ) -> Result<UserIdentity, AuthError> {
        let mut stage = AuthStage::Unauthenticated;
        let result = self.run(authorization, &mut stage).await;

        if let Err(err) = &result {
            match err {
                AuthError::InternalFault => {
                    tracing::error!(%stage, error = %err, "authentication aborted")
                }
                _ => tracing::warn!(%stage, error = %err, "authentication rejected"),
            }
        }

        result
    }

    async fn run(
        &self,
        authorization: Option<&HeaderValue>,
        stage: &mut AuthStage,
    ) -> Result<UserIdentity, AuthError> {
        let credential = extract_bearer(authorization)?;
        *stage = AuthStage::VerificationPending;

        let claims = self.verifier.verify(credential.token())?;
        *stage = AuthStage::ClaimsVerified;

        let identity = self.resolver.resolve(&claims).await?;
        *stage = AuthStage::Authenticated;

        tracing::debug!(user_id = %identity.id, "request authenticated");
        Ok(identity)
    }
}
