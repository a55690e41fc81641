//! Authentication Gateway middleware: `Authorization: Bearer <jwt>` → AuthCtx in extensions.
//!
//! Flow per request:
//! - Bearer 抽出 (形式不正なら暗号処理の前に 401)
//! - JWT 署名 + alg allow-list + exp/nbf 検証
//! - sub → ローカルユーザーの lookup (timeout 付き)
//! - AuthCtx を bind してから handler を呼ぶ
//!
//! どこで失敗しても handler は呼ばれない。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::bind;
use crate::error::AppError;
use crate::services::auth::AuthGateway;

/// 保護対象の Router に gateway を掛ける。
///
/// 例：
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, gateway.clone());
/// let v1 = public.merge(protected);
/// ```
pub fn apply<S>(router: Router<S>, gateway: Arc<AuthGateway>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(gateway, access_middleware))
}

async fn access_middleware(
    State(gateway): State<Arc<AuthGateway>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Dropping this future (client went away) abandons the lookup before anything is bound.
    let identity = gateway
        .authenticate(req.headers().get(header::AUTHORIZATION))
        .await?;

    // middleware → extractor への受け渡し
    bind(req.extensions_mut(), identity);

    Ok(next.run(req).await)
}
