pub mod carpools;
pub mod invites;
pub mod users;
