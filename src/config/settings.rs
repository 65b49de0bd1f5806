//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::constants::{
    DEFAULT_APP_NAME, DEFAULT_APP_URL, DEFAULT_CURRENCY, DEFAULT_DATABASE_URL,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DELIVERY_FEE_MINOR, DEFAULT_IDENTITY_JWKS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_EXPIRY_DAYS,
    MIN_SESSION_SECRET_LENGTH,
};

const DEV_SESSION_SECRET: &str = "dev-session-secret-minimum-32-chars!";
const DEV_ADMIN_API_KEY: &str = "dev-admin-key";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_development(self) -> bool {
        matches!(self, AppEnv::Development)
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(format!("unknown APP_ENV '{}'", other)),
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// Project id; used as the token audience and in the issuer
    pub project_id: Option<String>,
    /// JWKS endpoint publishing the provider's signing keys
    pub jwks_url: String,
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    session_secret: String,
    pub session_expiry_days: i64,
    admin_api_key: String,
    pub app_env: AppEnv,
    pub app_name: String,
    pub app_url: String,
    pub currency: String,
    pub delivery_fee: Decimal,
    pub identity: IdentitySettings,
    pub pdf_renderer_url: Option<String>,
    pub invoice_storage_dir: Option<String>,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("session_secret", &"[REDACTED]")
            .field("session_expiry_days", &self.session_expiry_days)
            .field("admin_api_key", &"[REDACTED]")
            .field("app_env", &self.app_env)
            .field("app_name", &self.app_name)
            .field("app_url", &self.app_url)
            .field("currency", &self.currency)
            .field("delivery_fee", &self.delivery_fee)
            .field("identity", &self.identity)
            .field("pdf_renderer_url", &self.pdf_renderer_url)
            .field("invoice_storage_dir", &self.invoice_storage_dir)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Development defaults. No environment variables are read.
    pub fn development() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_expiry_days: DEFAULT_SESSION_EXPIRY_DAYS,
            admin_api_key: DEV_ADMIN_API_KEY.to_string(),
            app_env: AppEnv::Development,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            delivery_fee: Decimal::new(DEFAULT_DELIVERY_FEE_MINOR, 2),
            identity: IdentitySettings {
                project_id: None,
                jwks_url: DEFAULT_IDENTITY_JWKS_URL.to_string(),
            },
            pdf_renderer_url: None,
            invoice_storage_dir: None,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics in release builds if SESSION_SECRET or ADMIN_API_KEY is missing,
    /// and whenever SESSION_SECRET is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::development();

        let session_secret = env::var("SESSION_SECRET")
            .unwrap_or_else(|_| required_in_release("SESSION_SECRET", &defaults.session_secret));

        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            panic!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            );
        }

        let admin_api_key = env::var("ADMIN_API_KEY")
            .unwrap_or_else(|_| required_in_release("ADMIN_API_KEY", &defaults.admin_api_key));

        let app_env = resolve_app_env(env::var("APP_ENV").ok().as_deref(), defaults.app_env);

        let delivery_fee = match env::var("DELIVERY_FEE") {
            Ok(value) => Decimal::from_str(value.trim())
                .map(|fee| fee.round_dp(2))
                .unwrap_or_else(|_| {
                    tracing::warn!(value = %value, "DELIVERY_FEE is not a decimal, using default");
                    defaults.delivery_fee
                }),
            Err(_) => defaults.delivery_fee,
        };

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.db_max_connections),
            session_secret,
            session_expiry_days: parse_env("SESSION_EXPIRY_DAYS")
                .unwrap_or(defaults.session_expiry_days),
            admin_api_key,
            app_env,
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
            app_url: env::var("APP_URL").unwrap_or(defaults.app_url),
            currency: env::var("CURRENCY").unwrap_or(defaults.currency),
            delivery_fee,
            identity: IdentitySettings {
                project_id: env::var("IDENTITY_PROJECT_ID").ok().filter(|v| !v.is_empty()),
                jwks_url: env::var("IDENTITY_JWKS_URL").unwrap_or(defaults.identity.jwks_url),
            },
            pdf_renderer_url: env::var("PDF_RENDERER_URL").ok().filter(|v| !v.is_empty()),
            invoice_storage_dir: env::var("INVOICE_STORAGE_DIR").ok().filter(|v| !v.is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Replace the secrets. Used by tests and tooling that build a config by hand.
    pub fn with_secrets(
        mut self,
        session_secret: impl Into<String>,
        admin_api_key: impl Into<String>,
    ) -> Self {
        self.session_secret = session_secret.into();
        self.admin_api_key = admin_api_key.into();
        self
    }

    /// Get session secret bytes for token signing/verification.
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Admin shared secret.
    pub fn admin_api_key(&self) -> &str {
        &self.admin_api_key
    }

    /// Session lifetime in seconds.
    pub fn session_max_age_seconds(&self) -> i64 {
        self.session_expiry_days * super::constants::SECONDS_PER_DAY
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// An unset `APP_ENV` keeps the default. An unrecognised one is treated as
/// production, so dev sign-in tokens stay disabled.
fn resolve_app_env(value: Option<&str>, default: AppEnv) -> AppEnv {
    match value {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|e: String| {
            tracing::warn!("{}, falling back to production", e);
            AppEnv::Production
        }),
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn required_in_release(key: &str, dev_default: &str) -> String {
    if cfg!(debug_assertions) {
        tracing::warn!("{} not set, using insecure default for development", key);
        dev_default.to_string()
    } else {
        panic!("{} environment variable must be set in production", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = Config::development();
        assert_eq!(config.currency, "DKK");
        assert_eq!(config.delivery_fee, Decimal::new(2900, 2));
        assert_eq!(config.session_max_age_seconds(), 7 * 86_400);
        assert!(config.app_env.is_development());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::development().with_secrets("super-secret-value-that-is-long-enough", "key-123");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("key-123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_app_env_parsing() {
        assert_eq!("production".parse::<AppEnv>(), Ok(AppEnv::Production));
        assert_eq!("Development".parse::<AppEnv>(), Ok(AppEnv::Development));
        assert!("staging".parse::<AppEnv>().is_err());
    }

    #[test]
    fn test_unknown_app_env_disables_dev_mode() {
        for value in ["staging", "test", "developmnet", ""] {
            let env = resolve_app_env(Some(value), AppEnv::Development);
            assert_eq!(env, AppEnv::Production, "{}", value);
            assert!(!env.is_development());
        }
        assert_eq!(resolve_app_env(Some("development"), AppEnv::Production), AppEnv::Development);
        assert_eq!(resolve_app_env(None, AppEnv::Development), AppEnv::Development);
    }
}
