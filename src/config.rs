//! Auth client configuration parsed from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;
const TOKEN_FILE_NAME: &str = "credentials.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// GitHub OAuth application client id. Empty when unset.
    pub github_client_id: String,
    pub api_url: String,
    pub token_file: PathBuf,
    pub callback_addr: SocketAddr,
    pub callback_timeout_secs: u64,
    pub timeouts: Timeouts,
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `GITHUB_CLIENT_ID`: empty when absent (sign-in URL will not work)
    /// - `DOWHILE_API_URL`: default `http://localhost:4000`
    /// - `DOWHILE_TOKEN_FILE`: default `$HOME/.dowhile/credentials.json`
    /// - `DOWHILE_CALLBACK_ADDR`: default `127.0.0.1:3000`
    /// - `DOWHILE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `DOWHILE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `DOWHILE_CALLBACK_TIMEOUT_SECS`: default 300
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric or address variable does not
    /// parse, or a timeout is `0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let github_client_id = std::env::var("GITHUB_CLIENT_ID").unwrap_or_default();
        if github_client_id.is_empty() {
            tracing::warn!("GITHUB_CLIENT_ID not set; sign-in URL will be rejected by GitHub");
        }

        let api_url = std::env::var("DOWHILE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let token_file = std::env::var("DOWHILE_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_file());

        let raw_addr = std::env::var("DOWHILE_CALLBACK_ADDR").unwrap_or_else(|_| DEFAULT_CALLBACK_ADDR.to_string());
        let callback_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid { var: "DOWHILE_CALLBACK_ADDR", value: raw_addr.clone() })?;

        let timeouts = Timeouts {
            request_secs: env_parse_u64("DOWHILE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("DOWHILE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let callback_timeout_secs = env_parse_u64("DOWHILE_CALLBACK_TIMEOUT_SECS", DEFAULT_CALLBACK_TIMEOUT_SECS)?;

        Ok(Self { github_client_id, api_url, token_file, callback_addr, callback_timeout_secs, timeouts })
    }
}

/// Parse a positive number of seconds; `0` would make every wait fail at once.
fn env_parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid { var: key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

fn default_token_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".dowhile").join(TOKEN_FILE_NAME),
        None => PathBuf::from(TOKEN_FILE_NAME),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
