use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};

use crate::error::AppError;
use crate::services::auth::{AuthError, UserIdentity};

use super::AuthCtx;

/// Attach the resolved identity to the request. Exactly once per request.
///
/// # Panics
/// If the request already carries an `AuthCtx`. The gateway runs once per
/// request, so a second bind is a wiring bug.
pub fn bind(extensions: &mut Extensions, identity: UserIdentity) {
    assert!(
        extensions.get::<AuthCtx>().is_none(),
        "AuthCtx is already bound for this request"
    );
    extensions.insert(AuthCtx::new(identity));
}

/// Identity bound by the gateway, or `None` for requests that did not pass it.
pub fn current_identity(extensions: &Extensions) -> Option<&UserIdentity> {
    extensions.get::<AuthCtx>().map(AuthCtx::identity)
}

/// Handler で、 AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（認証がかかってない・ミドルウェア未設定）
impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(ctx) => Ok(ctx.clone()),
            None => {
                tracing::error!("AuthCtx not found - auth middleware not configured for this route");
                Err(AuthError::MissingCredential.into())
            }
        }
    }
}
