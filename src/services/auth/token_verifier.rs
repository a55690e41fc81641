use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::{error::Error as StdError, fmt};

use crate::config::{AuthSettings, KeyFamily};
use crate::services::auth::error::AuthError;

/// Internal verification failures. Logged, never returned to clients.
#[derive(Debug)]
pub enum VerifyError {
    MalformedHeader(jsonwebtoken::errors::Error),
    AlgorithmNotAllowed(Algorithm),
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    TimestampOutOfRange(&'static str),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader(e) => write!(f, "malformed jwt header: {}", e),
            Self::AlgorithmNotAllowed(alg) => write!(f, "algorithm {:?} is not allowed", alg),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::TimestampOutOfRange(name) => write!(f, "'{}' is out of range", name),
        }
    }
}

impl StdError for VerifyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::MalformedHeader(e) | Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

/// Wire shape of the token payload.
///
/// `sub` and `exp` are required: a payload without them fails to deserialize.
#[derive(Debug, Clone, Deserialize)]
struct TokenClaims {
    sub: String,
    exp: u64,
    #[serde(default)]
    nbf: Option<u64>,
    #[serde(default)]
    iat: Option<u64>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    sid: Option<String>,
}

/// Signature-checked, schema-checked token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
    pub not_before: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub email: Option<String>,
    pub session_id: Option<String>,
}

/// Turns a bearer token into verified claims.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError>;
}

/// Public-key JWT verifier with a fixed algorithm allow-list.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(settings: &AuthSettings) -> Result<Self, String> {
        let pem = settings.public_key_pem.as_bytes();
        let decoding_key = match settings.key_family {
            KeyFamily::Rsa => DecodingKey::from_rsa_pem(pem),
            KeyFamily::Ec => DecodingKey::from_ec_pem(pem),
            KeyFamily::Ed => DecodingKey::from_ed_pem(pem),
        }
        .map_err(|e| format!("invalid {:?} public key pem: {}", settings.key_family, e))?;

        let Some(first) = settings.allowed_algorithms.first() else {
            return Err("empty algorithm allow-list".to_string());
        };

        let mut validation = Validation::new(*first);
        validation.algorithms = settings.allowed_algorithms.clone();
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;

        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        &self.validation.algorithms
    }

    /// Verify and decode a token, keeping the detailed failure reason.
    ///
    /// Order:
    /// 1. header `alg` must be in the allow-list (before any signature work)
    /// 2. signature against the trusted key
    /// 3. `exp` / `nbf` (and `iss` / `aud` when configured)
    /// 4. claims shape: non-empty `sub`, representable timestamps
    pub fn verify_detailed(&self, token: &str) -> Result<VerifiedClaims, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(VerifyError::MalformedHeader)?;
        if !self.validation.algorithms.contains(&header.alg) {
            return Err(VerifyError::AlgorithmNotAllowed(header.alg));
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(VerifyError::Jwt)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(VerifyError::EmptyClaim("sub"));
        }

        Ok(VerifiedClaims {
            subject: claims.sub,
            expires_at: to_datetime(claims.exp, "exp")?,
            not_before: claims.nbf.map(|v| to_datetime(v, "nbf")).transpose()?,
            issued_at: claims.iat.map(|v| to_datetime(v, "iat")).transpose()?,
            issuer: claims.iss,
            email: claims.email,
            session_id: claims.sid,
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        self.verify_detailed(token).map_err(|err| {
            tracing::warn!(
                error = %err,
                token_fingerprint = %fingerprint(token),
                "access token verification failed"
            );
            AuthError::InvalidCredential
        })
    }
}

fn to_datetime(secs: u64, claim: &'static str) -> Result<DateTime<Utc>, VerifyError> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or(VerifyError::TimestampOutOfRange(claim))
}

/// Short SHA-256 prefix of the token for log correlation.
fn fingerprint(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect()
}
