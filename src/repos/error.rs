/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - 制約違反は SQLSTATE で意味のある variant に寄せる
 *   - unique (users.external_id / users.email)       → Conflict
 *   - foreign key (invites.to_user など)             → MissingReference
 *   - check (carpools.available_seats <= seats など) → ConstraintViolated
 */
use thiserror::Error;

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("referenced row does not exist")]
    MissingReference,
    #[error("check constraint violated")]
    ConstraintViolated,
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => return RepoError::Conflict,
                Some(PG_FOREIGN_KEY_VIOLATION) => return RepoError::MissingReference,
                Some(PG_CHECK_VIOLATION) => return RepoError::ConstraintViolated,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}
