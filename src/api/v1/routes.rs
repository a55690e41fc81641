/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開 route と、Authentication Gateway の後ろに置く保護 route を分けて merge する
 */
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    carpools::{create_carpool, delete_carpool, get_carpool, list_carpools, update_carpool},
    health::health,
    invites::{create_invite, get_invite, respond_invite},
    profile::{get_profile, update_profile},
    users::create_user,
};
use crate::middleware::auth::access;
use crate::services::auth::AuthGateway;
use crate::state::AppState;

pub fn routes(gateway: Arc<AuthGateway>) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user));

    let protected = Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/carpools", get(list_carpools).post(create_carpool))
        .route(
            "/carpools/{carpool_id}",
            get(get_carpool).put(update_carpool).delete(delete_carpool),
        )
        .route("/invites", post(create_invite))
        .route(
            "/invites/{invite_id}",
            get(get_invite).put(respond_invite),
        );

    public.merge(access::apply(protected, gateway))
}
