//! Factory: build the `AuthGateway` from application `Config`.
use std::sync::Arc;

use crate::config::AuthSettings;
use crate::services::auth::{AuthGateway, IdentityResolver, JwtVerifier, UserDirectory};

pub fn build_auth_gateway(
    settings: &AuthSettings,
    directory: Arc<dyn UserDirectory>,
) -> anyhow::Result<Arc<AuthGateway>> {
    let verifier = JwtVerifier::new(settings).map_err(anyhow::Error::msg)?;

    tracing::info!(
        algorithms = ?verifier.allowed_algorithms(),
        issuer = ?settings.issuer,
        audience = ?settings.audience,
        "token verifier configured"
    );

    let resolver = IdentityResolver::new(directory, settings.resolution_timeout);

    Ok(Arc::new(AuthGateway::new(Arc::new(verifier), resolver)))
}
