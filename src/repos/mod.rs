pub mod carpool_repo;
pub mod error;
pub mod invite_repo;
pub mod user_repo;
