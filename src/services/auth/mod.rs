pub mod credential;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod identity_resolver;
pub mod token_verifier;

pub use error::{AuthError, AuthStage};
pub use factory::build_auth_gateway;
pub use gateway::AuthGateway;
pub use identity_resolver::{IdentityResolver, UserDirectory, UserIdentity};
pub use token_verifier::{JwtVerifier, TokenVerifier, VerifiedClaims};
