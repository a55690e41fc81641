pub mod auth_ctx;
pub mod input;

pub use auth_ctx::{AuthCtx, bind, current_identity};
pub use input::{ApiJson, ApiPath, ApiQuery};
