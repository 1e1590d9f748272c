//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LOYALTY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `LOYALTY_APP_BASE_URL` - Public URL of the customer app, used for deep links
//! - `LOYALTY_ADMIN_TOKEN` - Bearer token for the admin API (min 32 chars, high entropy)
//!
//! ## Optional
//! - `LOYALTY_HOST` - Bind address (default: 127.0.0.1)
//! - `LOYALTY_PORT` - Listen port (default: 3001)
//! - `QR_SERVICE_URL` - QR image rendering endpoint (default: api.qrserver.com)
//! - `QR_IMAGE_SIZE` - QR image edge length in pixels (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sample rates

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
const DEFAULT_QR_IMAGE_SIZE: u32 = 300;
const QR_IMAGE_SIZE_RANGE: std::ops::RangeInclusive<u32> = 64..=1000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the customer-facing app
    pub app_base_url: Url,
    /// Bearer token required on admin API routes
    pub admin_token: SecretString,
    /// QR image service configuration
    pub qr: QrConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// External QR rendering service.
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Endpoint that renders the `data` query parameter as a QR image
    pub service_url: Url,
    /// Edge length of the square image in pixels
    pub image_size: u32,
}

impl QrConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let service_url = parse_url(
            "QR_SERVICE_URL",
            &get_env_or_default("QR_SERVICE_URL", DEFAULT_QR_SERVICE_URL),
        )?;
        let image_size = get_optional_env("QR_IMAGE_SIZE")
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|e| ConfigError::InvalidEnvVar("QR_IMAGE_SIZE".to_string(), e.to_string()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_QR_IMAGE_SIZE);

        if !QR_IMAGE_SIZE_RANGE.contains(&image_size) {
            return Err(ConfigError::InvalidEnvVar(
                "QR_IMAGE_SIZE".to_string(),
                format!(
                    "must be between {} and {}",
                    QR_IMAGE_SIZE_RANGE.start(),
                    QR_IMAGE_SIZE_RANGE.end()
                ),
            ));
        }

        Ok(Self {
            service_url,
            image_size,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LOYALTY_DATABASE_URL")?;
        let host = get_env_or_default("LOYALTY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOYALTY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LOYALTY_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOYALTY_PORT".to_string(), e.to_string()))?;
        let app_base_url = parse_url(
            "LOYALTY_APP_BASE_URL",
            &get_required_env("LOYALTY_APP_BASE_URL")?,
        )?;
        let admin_token = get_validated_secret("LOYALTY_ADMIN_TOKEN")?;
        validate_token_length(&admin_token, "LOYALTY_ADMIN_TOKEN")?;

        let qr = QrConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            app_base_url,
            admin_token,
            qr,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http or https URL".to_string(),
        ));
    }
    Ok(url)
}

/// Validate that the admin token meets minimum length requirements.
fn validate_token_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_TOKEN_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/loyalty"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            app_base_url: Url::parse("https://app.loyalty.test").unwrap(),
            admin_token: SecretString::from("tK9#vQ2$mX7!pL4@zR8&wN3*cB6^hJ1%"),
            qr: QrConfig {
                service_url: Url::parse(DEFAULT_QR_SERVICE_URL).unwrap(),
                image_size: DEFAULT_QR_IMAGE_SIZE,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

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
    fn test_shannon_entropy_counts_chars_not_bytes() {
        assert!(shannon_entropy("ééé").abs() < f64::EPSILON);
        let entropy = shannon_entropy("日本");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-admin-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("abababababababababababababababab", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("tK9#vQ2$mX7!pL4@zR8&wN3*cB6^hJ1%", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_length() {
        assert!(validate_token_length(&SecretString::from("short"), "T").is_err());
        assert!(validate_token_length(&SecretString::from("a".repeat(32)), "T").is_ok());
    }

    #[test]
    fn test_parse_url_requires_http() {
        assert!(parse_url("T", "https://app.loyalty.test").is_ok());
        assert!(parse_url("T", "ftp://app.loyalty.test").is_err());
        assert!(parse_url("T", "not a url").is_err());
    }

    #[test]
    fn test_default_qr_service_url_is_valid() {
        let url = parse_url("QR_SERVICE_URL", DEFAULT_QR_SERVICE_URL).unwrap();
        assert_eq!(url.host_str(), Some("api.qrserver.com"));
        assert!(QR_IMAGE_SIZE_RANGE.contains(&DEFAULT_QR_IMAGE_SIZE));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());

        assert!(debug_output.contains("app.loyalty.test"));
        assert!(!debug_output.contains("tK9#vQ2$mX7"));
        assert!(!debug_output.contains("postgres://localhost/loyalty"));
    }
}
