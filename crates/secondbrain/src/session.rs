//! Saved login between CLI runs.
//!
//! The token is kept in a small JSON file next to where the CLI is run
//! (see `--session`). A token from `SECONDBRAIN_TOKEN` always wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use secondbrain_client::{token_from_env, ApiClient, ApiConfig, Credentials, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedSession {
    /// Backend the token was issued by
    pub base_url: String,
    pub access_token: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Load the saved session, if the file exists.
pub fn load(path: &Path) -> Result<Option<SavedSession>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let session: SavedSession = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file {}", path.display()))?;

    Ok(Some(session))
}

pub fn save(path: &Path, session: &SavedSession) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write session file {}", path.display()))?;
    debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Remove the saved session. Returns whether there was one.
pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove session file {}", path.display()))?;
    Ok(true)
}

/// Log in with `credentials` and remember the token.
pub async fn login(
    client: &ApiClient,
    credentials: &Credentials,
    path: &Path,
) -> Result<ApiClient> {
    let token = client
        .login(&credentials.username, &credentials.password)
        .await
        .context("Login failed")?;

    save(
        path,
        &SavedSession {
            base_url: client.base_url().to_string(),
            access_token: token.access_token.clone(),
            username: Some(credentials.username.clone()),
        },
    )?;
    info!(user = %credentials.username, "Logged in");

    Ok(client.with_token(token.access_token))
}

/// Create an account, then log in with it so the token is saved.
pub async fn register(
    client: &ApiClient,
    email: &str,
    password: &str,
    path: &Path,
) -> Result<(User, ApiClient)> {
    let user = client
        .register(email, password)
        .await
        .context("Registration failed")?;
    info!(user = %user.email, id = user.id, "Registered");

    let credentials = Credentials {
        username: email.to_string(),
        password: password.to_string(),
    };
    let authed = login(client, &credentials, path).await?;
    Ok((user, authed))
}

/// An authenticated client: `SECONDBRAIN_TOKEN`, then the session file,
/// then a fresh login with the credentials from the environment.
///
/// A saved token the backend rejects is removed before logging in again.
pub async fn connect(config: &ApiConfig, path: &Path) -> Result<ApiClient> {
    let client = ApiClient::new(config).context("Failed to build HTTP client")?;

    if let Some(token) = token_from_env() {
        debug!("Using token from environment");
        return Ok(client.with_token(token));
    }

    if let Some(saved) = from_saved(&client, path)? {
        match saved.current_user().await {
            Ok(user) => {
                debug!(user = %user.email, "Saved session is valid");
                return Ok(saved);
            }
            Err(e) if e.is_unauthorized() => {
                warn!(path = %path.display(), "Saved session was rejected, logging in again");
                clear(path)?;
            }
            Err(e) => return Err(e).context("Failed to check saved session"),
        }
    }

    let credentials = Credentials::from_env()
        .context("Not logged in and no credentials in the environment")?;
    login(&client, &credentials, path).await
}

/// Reuse the saved token when it was issued by the same backend.
fn from_saved(client: &ApiClient, path: &Path) -> Result<Option<ApiClient>> {
    match load(path)? {
        Some(saved) if saved.base_url == client.base_url() => {
            debug!(path = %path.display(), "Using saved session");
            Ok(Some(client.with_token(saved.access_token)))
        }
        Some(saved) => {
            debug!(saved = %saved.base_url, "Saved session is for another backend, ignoring");
            Ok(None)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secondbrain_client::{PASSWORD_VAR, TOKEN_VAR, USER_VAR};
    use tokio::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;
    use wiremock::matchers::{bearer_token, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> SavedSession {
        SavedSession {
            base_url: "http://localhost:8000".to_string(),
            access_token: "abc".to_string(),
            username: Some("me@example.com".to_string()),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        save(&path, &sample()).unwrap();
        assert_eq!(load(&path).unwrap(), Some(sample()));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(load(&path).is_err());
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        assert!(!clear(&path).unwrap());
        save(&path, &sample()).unwrap();
        assert!(clear(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_from_saved_matches_backend() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        save(&path, &sample()).unwrap();

        let same = ApiClient::new(&ApiConfig::new("http://localhost:8000")).unwrap();
        let client = from_saved(&same, &path).unwrap().unwrap();
        assert_eq!(client.token(), Some("abc"));

        let other = ApiClient::new(&ApiConfig::new("http://example.com")).unwrap();
        assert!(from_saved(&other, &path).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_saves_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();
        let credentials = Credentials {
            username: "me@example.com".to_string(),
            password: "pw".to_string(),
        };

        let authed = login(&client, &credentials, &path).await.unwrap();
        assert_eq!(authed.token(), Some("fresh"));

        let saved = load(&path).unwrap().unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.base_url, server.uri());
    }

    // ========== connect tests ==========

    /// `connect` reads the process environment, so tests touching it run
    /// one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::const_new(());

    async fn lock_env(token: Option<&str>) -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().await;
        match token {
            Some(token) => std::env::set_var(TOKEN_VAR, token),
            None => std::env::remove_var(TOKEN_VAR),
        }
        std::env::set_var(USER_VAR, "me@example.com");
        std::env::set_var(PASSWORD_VAR, "pw");
        guard
    }

    async fn mount_token(server: &MockServer, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(url_path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "bearer"
            })))
            .expect(times)
            .mount(server)
            .await;
    }

    async fn mount_me(server: &MockServer, token: &str, status: u16) {
        let response = if status == 200 {
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 1, "email": "me@example.com"}))
        } else {
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({"detail": "Could not validate credentials"}))
        };
        Mock::given(method("GET"))
            .and(url_path("/users/me/"))
            .and(bearer_token(token))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn save_for(server: &MockServer, path: &Path, token: &str) {
        save(
            path,
            &SavedSession {
                base_url: server.uri(),
                access_token: token.to_string(),
                username: None,
            },
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_connect_prefers_saved_session_over_login() {
        let _env = lock_env(None).await;
        let server = MockServer::start().await;
        mount_me(&server, "saved", 200).await;
        mount_token(&server, "fresh", 0).await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        save_for(&server, &path, "saved");

        let client = connect(&ApiConfig::new(server.uri()), &path).await.unwrap();
        assert_eq!(client.token(), Some("saved"));
    }

    #[tokio::test]
    async fn test_connect_env_token_wins() {
        let _env = lock_env(Some("from-env")).await;
        let server = MockServer::start().await;
        mount_token(&server, "fresh", 0).await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        save_for(&server, &path, "saved");

        let client = connect(&ApiConfig::new(server.uri()), &path).await;
        std::env::remove_var(TOKEN_VAR);

        assert_eq!(client.unwrap().token(), Some("from-env"));
    }

    #[tokio::test]
    async fn test_connect_logs_in_without_saved_session() {
        let _env = lock_env(None).await;
        let server = MockServer::start().await;
        mount_token(&server, "fresh", 1).await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let client = connect(&ApiConfig::new(server.uri()), &path).await.unwrap();
        assert_eq!(client.token(), Some("fresh"));
        assert_eq!(load(&path).unwrap().unwrap().access_token, "fresh");
    }

    #[tokio::test]
    async fn test_connect_replaces_rejected_saved_token() {
        let _env = lock_env(None).await;
        let server = MockServer::start().await;
        mount_me(&server, "stale", 401).await;
        mount_token(&server, "fresh", 1).await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        save_for(&server, &path, "stale");

        let client = connect(&ApiConfig::new(server.uri()), &path).await.unwrap();
        assert_eq!(client.token(), Some("fresh"));
        assert_eq!(load(&path).unwrap().unwrap().access_token, "fresh");
    }

    #[tokio::test]
    async fn test_register_then_logs_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/users/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "email": "new@example.com",
                "is_active": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_token(&server, "welcome", 1).await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();

        let (user, authed) = register(&client, "new@example.com", "pw", &path)
            .await
            .unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(authed.token(), Some("welcome"));
        let saved = load(&path).unwrap().unwrap();
        assert_eq!(saved.access_token, "welcome");
        assert_eq!(saved.username.as_deref(), Some("new@example.com"));
    }
}
