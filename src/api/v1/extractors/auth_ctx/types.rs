/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックや user lookup は middleware/services 側の責務
 * - 生成は core::bind からのみ (handler 側で作ることはできない)
 */
use uuid::Uuid;

use crate::services::auth::UserIdentity;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id()` はローカルのユーザーID。リソースの所有者チェックはこの値で行う
/// - 1 リクエストにつき 1 回だけ bind され、以後は読み取り専用
#[derive(Debug, Clone)]
pub struct AuthCtx {
    identity: UserIdentity,
}

impl AuthCtx {
    pub(super) fn new(identity: UserIdentity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> Uuid {
        self.identity.id
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }
}
