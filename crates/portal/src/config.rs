//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_DATABASE_URL` - SQLite connection string (falls back to `DATABASE_URL`)
//! - `PORTAL_BASE_URL` - Public URL for the portal
//! - `SESSION_SIGNING_KEY` - Session cookie signing key (min 32 chars, high entropy)
//! - `ASAAS_API_KEY` - Payments provider access token
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 3000)
//! - `ASAAS_BASE_URL` - Payments API base (default: sandbox)
//! - `REPLICATE_API_TOKEN` - LLM provider token (assistant page disabled when unset)
//! - `REPLICATE_MODEL` - Model id (default: meta/meta-llama-3-70b-instruct)
//! - `REPLICATE_BASE_URL` - LLM API base (default: https://api.replicate.com/v1)
//! - `CREDENTIALS_FILE` - Legacy YAML credentials seed (default: config.yaml)
//! - `KNOWLEDGE_DIR` - Assistant knowledge-base directory (default: ./conhecimento)
//! - `NOTIFY_WEBHOOK_URL` - Registration notification endpoint
//! - `SESSION_COOKIE_NAME` / `SESSION_EXPIRY_DAYS` - Override the seed file's cookie block
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `PORTAL_TLS_CERT` - PEM-encoded certificate chain
//! - `PORTAL_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SIGNING_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_ASAAS_BASE_URL: &str = "https://sandbox.asaas.com/api/v3";
const DEFAULT_LLM_BASE_URL: &str = "https://api.replicate.com/v1";
const DEFAULT_LLM_MODEL: &str = "meta/meta-llama-3-70b-instruct";

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

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Payments provider configuration
    pub asaas: AsaasConfig,
    /// LLM assistant configuration (optional - assistant disabled when unset)
    pub llm: Option<LlmConfig>,
    /// Legacy YAML credentials file used as a migration seed
    pub credentials_file: PathBuf,
    /// Directory of plain-text knowledge snippets for the assistant
    pub knowledge_dir: PathBuf,
    /// Webhook URL notified after a successful registration (optional)
    pub notify_webhook_url: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Session cookie configuration.
///
/// `cookie_name` and `expiry_days` stay `None` when the environment does not
/// override them; the legacy seed file's `cookie` block (or the built-in
/// defaults) fill them in at startup. The signing key always comes from the
/// environment.
#[derive(Clone)]
pub struct SessionConfig {
    /// Cookie signing key
    pub signing_key: SecretString,
    /// Cookie name override
    pub cookie_name: Option<String>,
    /// Cookie expiry override, in days
    pub expiry_days: Option<i64>,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_key", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

/// Payments provider (Asaas-style REST API) configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AsaasConfig {
    /// API base URL (e.g., <https://sandbox.asaas.com/api/v3>)
    pub base_url: String,
    /// Access token sent in the `access_token` header
    pub api_key: SecretString,
}

impl std::fmt::Debug for AsaasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsaasConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// LLM inference API (Replicate-style) configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Bearer token
    pub api_token: SecretString,
    /// Model id (e.g., meta/meta-llama-3-70b-instruct)
    pub model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("PORTAL_TLS_CERT");
        let key_pem = get_optional_env("PORTAL_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "PORTAL_TLS_*".to_string(),
                "Both PORTAL_TLS_CERT and PORTAL_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl PortalConfig {
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

        let database_url = get_database_url("PORTAL_DATABASE_URL")?;
        let host = get_env_or_default("PORTAL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORTAL_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("PORTAL_BASE_URL")?;

        let session = SessionConfig::from_env()?;
        let asaas = AsaasConfig::from_env()?;
        let llm = LlmConfig::from_env();

        let credentials_file =
            PathBuf::from(get_env_or_default("CREDENTIALS_FILE", "config.yaml"));
        let knowledge_dir = PathBuf::from(get_env_or_default("KNOWLEDGE_DIR", "./conhecimento"));
        let notify_webhook_url = get_optional_env("NOTIFY_WEBHOOK_URL");

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session,
            asaas,
            llm,
            credentials_file,
            knowledge_dir,
            notify_webhook_url,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the payments provider configuration.
    #[must_use]
    pub const fn asaas(&self) -> &AsaasConfig {
        &self.asaas
    }

    /// Returns a reference to the LLM configuration, if available.
    ///
    /// Returns `None` if `REPLICATE_API_TOKEN` was not set, which disables
    /// the assistant page's completions.
    #[must_use]
    pub const fn llm(&self) -> Option<&LlmConfig> {
        self.llm.as_ref()
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let signing_key = get_validated_secret("SESSION_SIGNING_KEY")?;
        validate_signing_key(&signing_key, "SESSION_SIGNING_KEY")?;

        let expiry_days = match get_optional_env("SESSION_EXPIRY_DAYS") {
            Some(raw) => Some(raw.parse::<i64>().map_err(|e| {
                ConfigError::InvalidEnvVar("SESSION_EXPIRY_DAYS".to_string(), e.to_string())
            })?),
            None => None,
        };

        Ok(Self {
            signing_key,
            cookie_name: get_optional_env("SESSION_COOKIE_NAME"),
            expiry_days,
        })
    }
}

impl AsaasConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_env_or_default("ASAAS_BASE_URL", DEFAULT_ASAAS_BASE_URL),
            api_key: get_validated_secret("ASAAS_API_KEY")?,
        })
    }
}

impl LlmConfig {
    /// Load LLM configuration from environment.
    ///
    /// Returns `None` if `REPLICATE_API_TOKEN` is not set (assistant disabled).
    fn from_env() -> Option<Self> {
        get_optional_env("REPLICATE_API_TOKEN").map(|token| {
            // Validate the token if present
            if let Err(e) = validate_secret_strength(&token, "REPLICATE_API_TOKEN") {
                tracing::warn!("REPLICATE_API_TOKEN validation warning: {e}");
            }
            Self {
                base_url: get_env_or_default("REPLICATE_BASE_URL", DEFAULT_LLM_BASE_URL),
                api_token: SecretString::from(token),
                model: get_env_or_default("REPLICATE_MODEL", DEFAULT_LLM_MODEL),
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
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

/// Validate that a signing key meets minimum length requirements.
fn validate_signing_key(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SIGNING_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SIGNING_KEY_LENGTH,
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens have high entropy)
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

    fn test_config() -> PortalConfig {
        PortalConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session: SessionConfig {
                signing_key: SecretString::from("x".repeat(64)),
                cookie_name: None,
                expiry_days: None,
            },
            asaas: AsaasConfig {
                base_url: DEFAULT_ASAAS_BASE_URL.to_string(),
                api_key: SecretString::from("aact_test_token"),
            },
            llm: None,
            credentials_file: PathBuf::from("config.yaml"),
            knowledge_dir: PathBuf::from("./conhecimento"),
            notify_webhook_url: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    #[test]
    fn shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn secret_strength_rejects_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn secret_strength_rejects_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn secret_strength_accepts_random() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn signing_key_too_short() {
        let key = SecretString::from("short");
        assert!(validate_signing_key(&key, "TEST_KEY").is_err());
    }

    #[test]
    fn signing_key_valid_length() {
        let key = SecretString::from("a".repeat(32));
        assert!(validate_signing_key(&key, "TEST_KEY").is_ok());
    }

    #[test]
    fn socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn asaas_config_debug_redacts_token() {
        let config = AsaasConfig {
            base_url: DEFAULT_ASAAS_BASE_URL.to_string(),
            api_key: SecretString::from("aact_super_private_token"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("sandbox.asaas.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("aact_super_private_token"));
    }

    #[test]
    fn llm_config_debug_redacts_token() {
        let config = LlmConfig {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_token: SecretString::from("r8_very_private"),
            model: DEFAULT_LLM_MODEL.to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains(DEFAULT_LLM_MODEL));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("r8_very_private"));
    }

    #[test]
    fn session_config_debug_redacts_key() {
        let config = SessionConfig {
            signing_key: SecretString::from("k".repeat(64)),
            cookie_name: Some("fp_session".to_string()),
            expiry_days: Some(30),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("fp_session"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(&"k".repeat(64)));
    }

    #[test]
    fn default_llm_model() {
        assert_eq!(DEFAULT_LLM_MODEL, "meta/meta-llama-3-70b-instruct");
    }
}
