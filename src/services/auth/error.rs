use thiserror::Error;

/// Why a request failed to authenticate.
///
/// Only `InternalFault` signals an unhealthy collaborator; every other
/// variant is an expected rejection of the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or malformed credential")]
    MissingCredential,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("unknown principal")]
    UnknownPrincipal,
    #[error("identity resolution timed out")]
    ResolutionTimeout,
    #[error("identity resolution failed")]
    InternalFault,
}

impl AuthError {
    /// Message returned to the client. Deliberately says nothing about the cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingCredential => "No token provided",
            Self::InvalidCredential | Self::UnknownPrincipal | Self::ResolutionTimeout => {
                "Invalid token"
            }
            Self::InternalFault => "internal server error",
        }
    }
}

/// Per-request authentication progress, used to label rejections in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Unauthenticated,
    VerificationPending,
    ClaimsVerified,
    Authenticated,
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::VerificationPending => "verification_pending",
            Self::ClaimsVerified => "claims_verified",
            Self::Authenticated => "authenticated",
        };
        f.write_str(s)
    }
}
