//! Bearer credential extraction from the `Authorization` header.
//!
//! Shape checks only. Nothing here touches key material, so a malformed
//! header is rejected before any cryptographic work happens.

use axum::http::HeaderValue;

use crate::services::auth::error::AuthError;

/// Raw token borrowed from the request header for the duration of one authentication.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BearerCredential<'a>(&'a str);

impl<'a> BearerCredential<'a> {
    pub fn token(&self) -> &'a str {
        self.0
    }
}

impl std::fmt::Debug for BearerCredential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.debug_tuple("BearerCredential").field(&"..").finish()
    }
}

/// Extract `<token>` from `Bearer <token>`.
///
/// - header absent, non-ASCII, wrong scheme, empty token or extra segments
///   all yield `MissingCredential`
/// - the scheme is matched case-insensitively
pub fn extract_bearer(header: Option<&HeaderValue>) -> Result<BearerCredential<'_>, AuthError> {
    let raw = header
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredential);
    }

    Ok(BearerCredential(token))
}
