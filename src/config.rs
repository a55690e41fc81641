/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 読み込んだ値は起動後に変更しない (プロセス全体で read-only 共有)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Key family of the trusted verification key.
///
/// All algorithms in the allow-list must share one family, because a single
/// decoding key is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    fn of(alg: Algorithm) -> Option<Self> {
        match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(Self::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(Self::Ec),
            Algorithm::EdDSA => Some(Self::Ed),
            // HS*: shared-secret algorithms have no public key and are never accepted.
            _ => None,
        }
    }
}

/// Settings consumed by the authentication gateway.
#[derive(Clone)]
pub struct AuthSettings {
    pub public_key_pem: String,
    pub key_family: KeyFamily,
    pub allowed_algorithms: Vec<Algorithm>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
    pub resolution_timeout: Duration,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthSettings")
            .field("key_family", &self.key_family)
            .field("allowed_algorithms", &self.allowed_algorithms)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("resolution_timeout", &self.resolution_timeout)
            .finish()
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_run_migrations: bool,

    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(25);

        let db_acquire_timeout = Duration::from_millis(
            lookup("DB_ACQUIRE_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(1000),
        );

        let db_run_migrations = lookup("DB_RUN_MIGRATIONS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth = Self::auth_settings(&lookup)?;

        // An unreachable database must surface as a pool error, not as a
        // resolution timeout.
        if db_acquire_timeout >= auth.resolution_timeout {
            return Err(ConfigError::Invalid("DB_ACQUIRE_TIMEOUT_MS"));
        }

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            db_max_connections,
            db_acquire_timeout,
            db_run_migrations,
            auth,
        })
    }

    fn auth_settings<F>(lookup: &F) -> Result<AuthSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let public_key_pem = lookup("AUTH_JWT_PUBLIC_KEY_PEM")
            .or_else(|| lookup("CLERK_JWT_PUBLIC_KEY"))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_JWT_PUBLIC_KEY_PEM"))?
            .replace("\\n", "\n");

        let (key_family, allowed_algorithms) = parse_allowed_algorithms(
            &lookup("AUTH_ALLOWED_ALGORITHMS").unwrap_or_else(|| "RS256".to_string()),
        )?;

        let issuer = lookup("AUTH_ISSUER").filter(|v| !v.trim().is_empty());
        let audience = lookup("AUTH_AUDIENCE").filter(|v| !v.trim().is_empty());

        let leeway_seconds = lookup("AUTH_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let resolution_timeout = Duration::from_millis(
            lookup("AUTH_RESOLUTION_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(2000),
        );

        Ok(AuthSettings {
            public_key_pem,
            key_family,
            allowed_algorithms,
            issuer,
            audience,
            leeway_seconds,
            resolution_timeout,
        })
    }
}

/// Parse a comma-separated algorithm allow-list.
///
/// Rejects unknown names, shared-secret algorithms, an empty list and lists
/// that mix key families.
pub fn parse_allowed_algorithms(raw: &str) -> Result<(KeyFamily, Vec<Algorithm>), ConfigError> {
    const KEY: &str = "AUTH_ALLOWED_ALGORITHMS";

    let mut family = None;
    let mut algorithms = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg = Algorithm::from_str(name).map_err(|_| ConfigError::Invalid(KEY))?;
        let alg_family = KeyFamily::of(alg).ok_or(ConfigError::Invalid(KEY))?;

        match family {
            None => family = Some(alg_family),
            Some(f) if f != alg_family => return Err(ConfigError::Invalid(KEY)),
            Some(_) => {}
        }

        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    let family = family.ok_or(ConfigError::Invalid(KEY))?;
    Ok((family, algorithms))
}
