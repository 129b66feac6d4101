//! Configuration loaded from environment variables.
//!
//! Each tool loads only the section it needs, so `remove-attribute` can run on a
//! host without database or SMTP settings and vice versa.
//!
//! # Environment Variables
//!
//! ## Identity store (`remove-attribute`)
//! - `IDENTITY_API_URL` - API base URL (e.g., `https://acme.onelogin.com/api/1`)
//! - `IDENTITY_CLIENT_ID` - OAuth client ID
//! - `IDENTITY_CLIENT_SECRET` - OAuth client secret
//! - `IDENTITY_TOKEN_URL` - Token endpoint (optional, default: `<api origin>/auth/oauth2/v2/token`)
//!
//! ## Attachment report (`attachment-report`)
//! - `REPORT_DATABASE_URL` - `MySQL` connection string (falls back to `DATABASE_URL`)
//! - `REPORT_FROM` - Email sender address
//! - `REPORT_RECIPIENTS` - Comma-separated recipient addresses
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_PORT` - SMTP port (optional, default: 25)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - SMTP credentials (optional, both or neither)
//!
//! ## Optional
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SMTP_PORT: &str = "25";
const TOKEN_PATH: &str = "/auth/oauth2/v2/token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Identity-store API configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// API base URL without a trailing slash
    pub api_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl IdentityConfig {
    /// Load the identity-store section from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the API URL is
    /// not an absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_required_env("IDENTITY_API_URL")?;
        let token_url = match get_optional_env("IDENTITY_TOKEN_URL") {
            Some(url) => url,
            None => derive_token_url(&api_url)?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            client_id: get_required_env("IDENTITY_CLIENT_ID")?,
            client_secret: get_required_secret("IDENTITY_CLIENT_SECRET")?,
        })
    }
}

/// SMTP credentials.
#[derive(Clone)]
pub struct SmtpCredentials {
    /// SMTP authentication username
    pub username: String,
    /// SMTP authentication password
    pub password: SecretString,
}

/// Email (SMTP) configuration for delivering reports.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// Credentials; `None` sends through an unauthenticated relay
    pub credentials: Option<SmtpCredentials>,
    /// Email sender address (From header)
    pub from_address: String,
    /// Report recipients (To header)
    pub recipients: Vec<String>,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field(
                "smtp_username",
                &self.credentials.as_ref().map(|c| c.username.as_str()),
            )
            .field(
                "smtp_password",
                &self.credentials.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from_address", &self.from_address)
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let smtp_port = get_env_or_default("SMTP_PORT", DEFAULT_SMTP_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        let credentials = match (
            get_optional_env("SMTP_USERNAME"),
            get_optional_env("SMTP_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(SmtpCredentials {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "SMTP_*".to_string(),
                    "Both SMTP_USERNAME and SMTP_PASSWORD must be set together".to_string(),
                ));
            }
        };

        let recipients = parse_recipients(&get_required_env("REPORT_RECIPIENTS")?);
        if recipients.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "REPORT_RECIPIENTS".to_string(),
                "at least one recipient is required".to_string(),
            ));
        }

        Ok(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port,
            credentials,
            from_address: get_required_env("REPORT_FROM")?,
            recipients,
        })
    }
}

/// Attachment report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// `MySQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Email delivery settings
    pub email: EmailConfig,
}

impl ReportConfig {
    /// Load the report section from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: get_database_url("REPORT_DATABASE_URL")?,
            email: EmailConfig::from_env()?,
        })
    }
}

/// Error tracking configuration, shared by both tools.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
}

impl TelemetryConfig {
    /// Load optional telemetry settings. Never fails.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            sentry_dsn: get_optional_env("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
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

/// Token endpoint on the same origin as the API.
fn derive_token_url(api_url: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(api_url)
        .map_err(|e| ConfigError::InvalidEnvVar("IDENTITY_API_URL".to_string(), e.to_string()))?;

    if !parsed.has_host() {
        return Err(ConfigError::InvalidEnvVar(
            "IDENTITY_API_URL".to_string(),
            "URL has no host".to_string(),
        ));
    }

    Ok(format!("{}{TOKEN_PATH}", parsed.origin().ascii_serialization()))
}

/// Split a comma-separated recipient list, dropping blanks.
fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_token_url() {
        let url = derive_token_url("https://acme.onelogin.com/api/1").unwrap();
        assert_eq!(url, "https://acme.onelogin.com/auth/oauth2/v2/token");
    }

    #[test]
    fn test_derive_token_url_keeps_port() {
        let url = derive_token_url("http://127.0.0.1:8080/api/1/").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/auth/oauth2/v2/token");
    }

    #[test]
    fn test_derive_token_url_rejects_relative() {
        let result = derive_token_url("/api/1");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients("recipient01@domain.com, recipient02@domain.com"),
            vec!["recipient01@domain.com", "recipient02@domain.com"]
        );
        assert_eq!(parse_recipients(" a@b.c ,, "), vec!["a@b.c"]);
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn test_identity_config_debug_redacts_secrets() {
        let config = IdentityConfig {
            api_url: "https://acme.onelogin.com/api/1".to_string(),
            token_url: "https://acme.onelogin.com/auth/oauth2/v2/token".to_string(),
            client_id: "client-123".to_string(),
            client_secret: SecretString::from("super_secret_client_secret"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("acme.onelogin.com"));
        assert!(debug_output.contains("client-123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
    }

    #[test]
    fn test_email_config_debug_redacts_secrets() {
        let config = EmailConfig {
            smtp_host: "mail-server.domain.com".to_string(),
            smtp_port: 25,
            credentials: Some(SmtpCredentials {
                username: "mailer".to_string(),
                password: SecretString::from("super_secret_smtp_password"),
            }),
            from_address: "sender@domain.com".to_string(),
            recipients: vec!["recipient01@domain.com".to_string()],
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("mail-server.domain.com"));
        assert!(debug_output.contains("mailer"));
        assert!(debug_output.contains("recipient01@domain.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }
}
