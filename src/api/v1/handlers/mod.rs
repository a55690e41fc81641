pub mod carpools;
pub mod health;
pub mod invites;
pub mod profile;
pub mod users;
