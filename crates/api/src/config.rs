//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MARKET_STALL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` or `MARKET_STALL_PORT` - Listen port (default: 3000)
//! - `MARKET_STALL_ENV` - `development` or `production` (default: development)
//! - `CORS_ORIGIN` - Allowed browser origin (default: <http://localhost:3000>)
//! - `SESSION_TTL_SECONDS` - Fixed session lifetime (default: 86400)
//! - `SESSION_MAX_COUNT` - Maximum number of logged-in sessions (default: 100000)
//! - `BOOTSTRAP_ADMIN_USERNAME` / `BOOTSTRAP_ADMIN_PASSWORD` - Seed admin account
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_BOOTSTRAP_PASSWORD_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_MAX_COUNT: u64 = 100_000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "admin",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development over plain HTTP.
    #[default]
    Development,
    /// Served over HTTPS.
    Production,
}

impl Environment {
    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub const fn secure_cookies(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Browser origin allowed by CORS
    pub cors_origin: String,
    /// Session store settings
    pub session: SessionConfig,
    /// Admin account created at startup, if configured
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Session store configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Lifetime of a session, fixed from creation.
    pub ttl: Duration,
    /// Upper bound on stored (logged-in) sessions.
    pub max_sessions: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            max_sessions: DEFAULT_SESSION_MAX_COUNT,
        }
    }
}

/// Credentials for the admin account seeded at startup.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct BootstrapAdmin {
    /// Login name of the seeded admin
    pub username: String,
    /// Plaintext password, hashed before it is stored
    pub password: SecretString,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            environment: Environment::Development,
            cors_origin: "http://localhost:3000".to_string(),
            session: SessionConfig::default(),
            bootstrap_admin: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if the bootstrap
    /// admin is half-configured or its password fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("MARKET_STALL_HOST", "127.0.0.1")?;
        let port = match get_optional_env("PORT") {
            Some(port) => parse_value::<u16>("PORT", &port)?,
            None => parse_env_or_default("MARKET_STALL_PORT", "3000")?,
        };
        let environment = parse_env_or_default("MARKET_STALL_ENV", "development")?;
        let cors_origin = get_env_or_default("CORS_ORIGIN", "http://localhost:3000");

        let session = SessionConfig {
            ttl: Duration::from_secs(parse_env_or_default(
                "SESSION_TTL_SECONDS",
                &DEFAULT_SESSION_TTL_SECONDS.to_string(),
            )?),
            max_sessions: parse_env_or_default(
                "SESSION_MAX_COUNT",
                &DEFAULT_SESSION_MAX_COUNT.to_string(),
            )?,
        };
        if session.ttl.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_TTL_SECONDS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let bootstrap_admin = BootstrapAdmin::from_env()?;

        Ok(Self {
            host,
            port,
            environment,
            cors_origin,
            session,
            bootstrap_admin,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BootstrapAdmin {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let username = get_optional_env("BOOTSTRAP_ADMIN_USERNAME");
        let password = get_optional_env("BOOTSTRAP_ADMIN_PASSWORD");

        match (username, password) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "BOOTSTRAP_ADMIN_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "BOOTSTRAP_ADMIN_USERNAME".to_string(),
            )),
            (Some(username), Some(password)) => {
                let password = SecretString::from(password);
                validate_bootstrap_password(&password, "BOOTSTRAP_ADMIN_PASSWORD")?;
                Ok(Some(Self { username, password }))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that the bootstrap password is long, not a placeholder, and has
/// sufficient entropy.
fn validate_bootstrap_password(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.chars().count() < MIN_BOOTSTRAP_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_BOOTSTRAP_PASSWORD_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated password."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_bootstrap_password_too_short() {
        let result = validate_bootstrap_password(&SecretString::from("aB3$xY9!"), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_bootstrap_password_placeholder() {
        let result = validate_bootstrap_password(
            &SecretString::from("changeme-aB3$xY9!mK2@"),
            "TEST_VAR",
        );
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_bootstrap_password_low_entropy() {
        let result =
            validate_bootstrap_password(&SecretString::from("abababababababababab"), "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_bootstrap_password_valid() {
        let result = validate_bootstrap_password(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&"),
            "TEST_VAR",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "Development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_secure_cookies_only_in_production() {
        assert!(Environment::Production.secure_cookies());
        assert!(!Environment::Development.secure_cookies());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            port: 8080,
            ..ApiConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_default_session_ttl_is_one_day() {
        assert_eq!(SessionConfig::default().ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_bootstrap_admin_debug_redacts_password() {
        let admin = BootstrapAdmin {
            username: "root".to_string(),
            password: SecretString::from("super_hidden_value"),
        };

        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("root"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_hidden_value"));
    }
}
