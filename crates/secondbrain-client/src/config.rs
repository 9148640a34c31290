//! Configuration loading from environment variables.

use crate::error::ApiError;

/// Backend used when `SECONDBRAIN_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://smartbrainbackend.roeiduenyas.me";

pub const API_URL_VAR: &str = "SECONDBRAIN_API_URL";
pub const USER_VAR: &str = "SECONDBRAIN_USER";
pub const PASSWORD_VAR: &str = "SECONDBRAIN_PASSWORD";
pub const TOKEN_VAR: &str = "SECONDBRAIN_TOKEN";

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Load the backend URL from the environment (or a `.env` file),
    /// falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        match std::env::var(API_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::new(DEFAULT_API_URL),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Login credentials loaded from environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Load credentials from environment variables.
    ///
    /// Expects `SECONDBRAIN_USER` and `SECONDBRAIN_PASSWORD` to be set,
    /// either in the environment or in a `.env` file.
    pub fn from_env() -> Result<Self, ApiError> {
        let _ = dotenvy::dotenv();

        let username = std::env::var(USER_VAR)
            .map_err(|_| ApiError::Config(format!("{USER_VAR} environment variable not set")))?;

        let password = std::env::var(PASSWORD_VAR).map_err(|_| {
            ApiError::Config(format!("{PASSWORD_VAR} environment variable not set"))
        })?;

        Ok(Self { username, password })
    }
}

/// Token supplied directly through `SECONDBRAIN_TOKEN`, if any.
pub fn token_from_env() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var(TOKEN_VAR)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
