//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials for the Google authorization-code flow. Only present when all
/// three variables are configured; the Google routes are disabled otherwise.
#[derive(Clone, Debug)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub google_oauth: Option<GoogleOAuthConfig>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let jwt_ttl_days = parse_or_default("JWT_TTL_DAYS", std::env::var("JWT_TTL_DAYS").ok(), 30)?;

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|s| split_origins(&s))
            .unwrap_or_else(|_| vec![frontend_url.clone()]);

        let google_oauth = match (
            std::env::var("GOOGLE_CLIENT_ID"),
            std::env::var("GOOGLE_CLIENT_SECRET"),
            std::env::var("GOOGLE_REDIRECT_URL"),
        ) {
            (Ok(client_id), Ok(client_secret), Ok(redirect_url)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_url,
            }),
            _ => None,
        };

        // --- Load Adapter-specific Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let max_upload_bytes = parse_or_default(
            "MAX_UPLOAD_BYTES",
            std::env::var("MAX_UPLOAD_BYTES").ok(),
            5 * 1024 * 1024,
        )?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            jwt_secret,
            jwt_ttl_days,
            frontend_url,
            allowed_origins,
            openai_api_key,
            chat_model,
            google_oauth,
            upload_dir,
            max_upload_bytes,
        })
    }
}

/// Splits a comma-separated origin list, trimming whitespace around each
/// entry and dropping empty entries.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Parses an optional environment value, falling back to `default` when the
/// variable is unset and failing with `InvalidValue` when it is malformed.
fn parse_or_default<T>(var: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(s) => s
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_is_split_and_trimmed() {
        assert_eq!(
            split_origins("http://localhost:8080, https://app.example.com ,"),
            vec![
                "http://localhost:8080".to_string(),
                "https://app.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn blank_origin_entries_are_dropped() {
        assert!(split_origins("  , ,").is_empty());
        assert!(split_origins("").is_empty());
    }

    #[test]
    fn unset_numeric_vars_take_their_default() {
        assert_eq!(parse_or_default::<i64>("JWT_TTL_DAYS", None, 30).unwrap(), 30);
        assert_eq!(
            parse_or_default::<usize>("MAX_UPLOAD_BYTES", None, 5 * 1024 * 1024).unwrap(),
            5 * 1024 * 1024
        );
    }

    #[test]
    fn set_numeric_vars_override_the_default() {
        let ttl = parse_or_default::<i64>("JWT_TTL_DAYS", Some("7".to_string()), 30).unwrap();
        assert_eq!(ttl, 7);
    }

    #[test]
    fn malformed_numeric_vars_are_invalid_value_errors() {
        let err =
            parse_or_default::<i64>("JWT_TTL_DAYS", Some("soon".to_string()), 30).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "JWT_TTL_DAYS"));
    }
}
